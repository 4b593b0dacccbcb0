// src/utils/sigv4.rs

//! AWS Signature Version 4 request signing.
//!
//! PA-API 5 requests are plain POSTs signed with the standard SigV4
//! scheme over the `content-encoding`, `host`, `x-amz-date` and
//! `x-amz-target` headers.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-encoding;host;x-amz-date;x-amz-target";

/// Content-Encoding value required by PA-API 5.
pub const CONTENT_ENCODING: &str = "amz-1.0";

/// Inputs of one signing operation.
pub struct SigningRequest<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub target: &'a str,
    pub payload: &'a str,
    pub timestamp: DateTime<Utc>,
}

/// Headers to attach to the signed request.
pub struct SignedHeaders {
    /// `x-amz-date` value
    pub amz_date: String,
    /// `Authorization` value
    pub authorization: String,
}

/// Sign a POST request and return the headers that carry the signature.
pub fn sign(req: &SigningRequest<'_>) -> SignedHeaders {
    let amz_date = req.timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = req.timestamp.format("%Y%m%d").to_string();

    let canonical_headers = format!(
        "content-encoding:{CONTENT_ENCODING}\nhost:{}\nx-amz-date:{}\nx-amz-target:{}\n",
        req.host, amz_date, req.target
    );
    let canonical_request = format!(
        "POST\n{}\n\n{}\n{}\n{}",
        req.path,
        canonical_headers,
        SIGNED_HEADERS,
        hex_sha256(req.payload.as_bytes())
    );

    let scope = format!("{date_stamp}/{}/{}/aws4_request", req.region, req.service);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex_sha256(canonical_request.as_bytes())
    );

    let key = signing_key(req.secret_key, &date_stamp, req.region, req.service);
    let signature = hex::encode(hmac(&key, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
        req.access_key
    );

    SignedHeaders {
        amz_date,
        authorization,
    }
}

/// Derive the per-day signing key from the secret.
fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac(&k_date, region.as_bytes());
    let k_service = hmac(&k_region, service.as_bytes());
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_request<'a>(payload: &'a str, secret: &'a str) -> SigningRequest<'a> {
        SigningRequest {
            access_key: "AKIDEXAMPLE",
            secret_key: secret,
            region: "eu-west-1",
            service: "ProductAdvertisingAPI",
            host: "webservices.amazon.es",
            path: "/paapi5/searchitems",
            target: "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems",
            payload,
            timestamp: Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap(),
        }
    }

    #[test]
    fn known_answer_signature() {
        let req = sample_request("{}", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY");
        let signed = sign(&req);
        assert_eq!(signed.amz_date, "20150830T123600Z");
        assert_eq!(
            signed.authorization,
            "AWS4-HMAC-SHA256 \
             Credential=AKIDEXAMPLE/20150830/eu-west-1/ProductAdvertisingAPI/aws4_request, \
             SignedHeaders=content-encoding;host;x-amz-date;x-amz-target, \
             Signature=821ead57969b0649a1e7ae3b5d57b91c16fe61b041930bc60f4d1b20738c9b24"
        );
    }

    #[test]
    fn signature_changes_with_payload() {
        let secret = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
        let a = sign(&sample_request("{}", secret));
        let b = sign(&sample_request("{\"ItemPage\":2}", secret));
        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn signature_changes_with_secret() {
        let a = sign(&sample_request("{}", "secret-a"));
        let b = sign(&sample_request("{}", "secret-b"));
        assert_ne!(a.authorization, b.authorization);
    }
}
