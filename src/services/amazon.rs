// src/services/amazon.rs

//! Amazon Product Advertising API (PA-API 5) client.
//!
//! Implements the `SearchItems` operation with SigV4 request signing and
//! maps response items into `ProductRecord`s.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Credentials;
use crate::error::{AppError, Result};
use crate::models::{ProductRecord, SearchConfig, Strategy, StrategyKind};
use crate::utils::sigv4::{self, SigningRequest};

/// A catalog/search provider that returns candidate products for a strategy.
#[async_trait]
pub trait ProductSource {
    /// Search the catalog. `page` selects the result window (1-based).
    async fn search(&self, strategy: &Strategy, page: u32) -> Result<Vec<ProductRecord>>;
}

const SERVICE: &str = "ProductAdvertisingAPI";
const SEARCH_PATH: &str = "/paapi5/searchitems";
const SEARCH_TARGET: &str = "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems";
const PARTNER_TYPE: &str = "Associates";
const DELIVERY_FLAGS: &[&str] = &["Prime"];

/// Response attributes requested for each item.
const RESOURCES: &[&str] = &[
    "Images.Primary.Large",
    "ItemInfo.Title",
    "Offers.Listings.Price",
    "Offers.Listings.Saving",
];

/// Endpoint parameters for one marketplace.
#[derive(Debug, Clone, Copy)]
struct Marketplace {
    host: &'static str,
    region: &'static str,
    marketplace: &'static str,
}

/// Resolve a country code to its PA-API endpoint.
fn marketplace_for(country: &str) -> Option<Marketplace> {
    let m = match country.to_ascii_uppercase().as_str() {
        "ES" => Marketplace {
            host: "webservices.amazon.es",
            region: "eu-west-1",
            marketplace: "www.amazon.es",
        },
        "DE" => Marketplace {
            host: "webservices.amazon.de",
            region: "eu-west-1",
            marketplace: "www.amazon.de",
        },
        "FR" => Marketplace {
            host: "webservices.amazon.fr",
            region: "eu-west-1",
            marketplace: "www.amazon.fr",
        },
        "IT" => Marketplace {
            host: "webservices.amazon.it",
            region: "eu-west-1",
            marketplace: "www.amazon.it",
        },
        "UK" | "GB" => Marketplace {
            host: "webservices.amazon.co.uk",
            region: "eu-west-1",
            marketplace: "www.amazon.co.uk",
        },
        "US" => Marketplace {
            host: "webservices.amazon.com",
            region: "us-east-1",
            marketplace: "www.amazon.com",
        },
        _ => return None,
    };
    Some(m)
}

/// PA-API 5 client implementing `ProductSource`.
pub struct PaapiClient {
    client: Client,
    access_key: String,
    secret_key: String,
    partner_tag: String,
    marketplace: Marketplace,
    item_count: u8,
}

impl PaapiClient {
    /// Create a client for the credentials' marketplace.
    pub fn new(credentials: &Credentials, search: &SearchConfig) -> Result<Self> {
        let marketplace = marketplace_for(&credentials.amazon_country).ok_or_else(|| {
            AppError::config(format!(
                "Unsupported marketplace country: {}",
                credentials.amazon_country
            ))
        })?;
        let client = Client::builder()
            .user_agent(&search.user_agent)
            .timeout(Duration::from_secs(search.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            access_key: credentials.amazon_access_key.clone(),
            secret_key: credentials.amazon_secret_key.clone(),
            partner_tag: credentials.amazon_associate_tag.clone(),
            marketplace,
            item_count: search.item_count,
        })
    }

    fn build_request<'a>(&'a self, strategy: &'a Strategy, page: u32) -> SearchItemsRequest<'a> {
        let (keywords, browse_node_id) = match strategy.kind {
            StrategyKind::Keyword => (Some(strategy.value.as_str()), None),
            StrategyKind::CategoryNode => (None, Some(strategy.value.as_str())),
        };
        SearchItemsRequest {
            keywords,
            browse_node_id,
            item_page: page,
            item_count: self.item_count,
            min_saving_percent: strategy.min_saving,
            delivery_flags: DELIVERY_FLAGS,
            partner_tag: &self.partner_tag,
            partner_type: PARTNER_TYPE,
            marketplace: self.marketplace.marketplace,
            resources: RESOURCES,
        }
    }
}

#[async_trait]
impl ProductSource for PaapiClient {
    async fn search(&self, strategy: &Strategy, page: u32) -> Result<Vec<ProductRecord>> {
        let payload = serde_json::to_string(&self.build_request(strategy, page))?;

        let signed = sigv4::sign(&SigningRequest {
            access_key: &self.access_key,
            secret_key: &self.secret_key,
            region: self.marketplace.region,
            service: SERVICE,
            host: self.marketplace.host,
            path: SEARCH_PATH,
            target: SEARCH_TARGET,
            payload: &payload,
            timestamp: Utc::now(),
        });

        let url = format!("https://{}{}", self.marketplace.host, SEARCH_PATH);
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json; charset=utf-8")
            .header("content-encoding", sigv4::CONTENT_ENCODING)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-target", SEARCH_TARGET)
            .header("authorization", &signed.authorization)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::source(
                strategy.name.clone(),
                format!("{status}: {body}"),
            ));
        }

        let parsed: SearchItemsResponse = response.json().await?;
        let items = parsed
            .search_result
            .map(|r| r.items)
            .unwrap_or_default();
        Ok(items.into_iter().filter_map(into_record).collect())
    }
}

/// Map a response item to a `ProductRecord`.
///
/// Items without a title are dropped; price, saving and image stay
/// optional so the formatter decides whether the candidate is publishable.
fn into_record(item: Item) -> Option<ProductRecord> {
    let title = item.item_info.and_then(|i| i.title).map(|t| t.display_value)?;
    let listing = item
        .offers
        .and_then(|o| o.listings.into_iter().next());
    let price = listing.and_then(|l| l.price);
    Some(ProductRecord {
        id: item.asin,
        title,
        detail_url: item.detail_page_url,
        price_display: price.as_ref().and_then(|p| p.display_amount.clone()),
        saving_display: price
            .and_then(|p| p.savings)
            .and_then(|s| s.display_amount),
        image_url: item
            .images
            .and_then(|i| i.primary)
            .and_then(|p| p.large)
            .map(|l| l.url),
    })
}

// --- Wire format ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SearchItemsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    keywords: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    browse_node_id: Option<&'a str>,
    item_page: u32,
    item_count: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_saving_percent: Option<u8>,
    delivery_flags: &'a [&'a str],
    partner_tag: &'a str,
    partner_type: &'a str,
    marketplace: &'a str,
    resources: &'a [&'a str],
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct SearchItemsResponse {
    #[serde(default)]
    search_result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResult {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(rename = "ASIN")]
    asin: String,
    #[serde(rename = "DetailPageURL")]
    detail_page_url: String,
    #[serde(rename = "ItemInfo", default)]
    item_info: Option<ItemInfo>,
    #[serde(rename = "Offers", default)]
    offers: Option<Offers>,
    #[serde(rename = "Images", default)]
    images: Option<Images>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemInfo {
    #[serde(default)]
    title: Option<Title>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Title {
    display_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Offers {
    #[serde(default)]
    listings: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Listing {
    #[serde(default)]
    price: Option<Price>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Price {
    #[serde(default)]
    display_amount: Option<String>,
    #[serde(default)]
    savings: Option<Savings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Savings {
    #[serde(default)]
    display_amount: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Images {
    #[serde(default)]
    primary: Option<ImageSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageSet {
    #[serde(default)]
    large: Option<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    #[serde(rename = "URL")]
    url: String,
}
