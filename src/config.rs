// src/config.rs

//! Startup credential loading.
//!
//! Credentials are read once from the environment (a local `.env` file is
//! honored via dotenvy) and are immutable afterwards. A missing credential
//! aborts the process before any loop starts.

use std::env;

use crate::error::{AppError, Result};

/// Credentials and account settings for the external collaborators.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Telegram bot token
    pub telegram_bot_token: String,

    /// Telegram channel or chat identifier to broadcast to
    pub telegram_chat_id: String,

    /// PA-API access key
    pub amazon_access_key: String,

    /// PA-API secret key
    pub amazon_secret_key: String,

    /// Associate tag used in affiliate URLs
    pub amazon_associate_tag: String,

    /// Marketplace country code (default "ES")
    pub amazon_country: String,
}

impl Credentials {
    /// Load credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load credentials through an arbitrary lookup function.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            telegram_bot_token: require(&get, "TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: require(&get, "TELEGRAM_CHAT_ID")?,
            amazon_access_key: require(&get, "AMAZON_ACCESS_KEY")?,
            amazon_secret_key: require(&get, "AMAZON_SECRET_KEY")?,
            amazon_associate_tag: require(&get, "AMAZON_ASSOCIATE_TAG")?,
            amazon_country: get("AMAZON_COUNTRY")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "ES".to_string()),
        })
    }
}

/// Fetch a required variable, rejecting empty values.
fn require(get: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    get(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("Missing required credential: {name}")))
}
