// src/services/telegram.rs

//! Telegram Bot API publisher.
//!
//! Delivers outbound messages to the configured channel: `sendPhoto` when
//! the message carries an image, `sendMessage` otherwise. Captions are
//! rendered as Markdown and every message carries exactly one inline URL
//! button.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::OutboundMessage;

/// A broadcast channel that delivers formatted messages.
#[async_trait]
pub trait Publisher {
    async fn publish(&self, message: &OutboundMessage) -> Result<()>;
}

const API_BASE: &str = "https://api.telegram.org";
const PARSE_MODE: &str = "Markdown";

/// Telegram Bot API client bound to one chat.
///
/// Cloning is cheap and shares the underlying connection pool, so the
/// discovery loop and the broadcaster can each hold a handle.
#[derive(Debug, Clone)]
pub struct TelegramBot {
    client: Client,
    token: String,
    chat_id: String,
}

impl TelegramBot {
    /// Create a publisher for the given bot token and chat.
    pub fn new(token: &str, chat_id: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    async fn call<T: Serialize + Sync>(&self, method: &str, body: &T) -> Result<()> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let api: ApiResponse = response.json().await?;
        if api.ok {
            Ok(())
        } else {
            Err(AppError::publish(
                method,
                api.description
                    .unwrap_or_else(|| "unknown Telegram API error".to_string()),
            ))
        }
    }
}

#[async_trait]
impl Publisher for TelegramBot {
    async fn publish(&self, message: &OutboundMessage) -> Result<()> {
        let reply_markup = InlineKeyboardMarkup::single_button(
            &message.button_label,
            &message.button_url,
        );
        match &message.image_url {
            Some(photo) => {
                self.call(
                    "sendPhoto",
                    &SendPhoto {
                        chat_id: &self.chat_id,
                        photo,
                        caption: &message.caption,
                        parse_mode: PARSE_MODE,
                        reply_markup,
                    },
                )
                .await
            }
            None => {
                self.call(
                    "sendMessage",
                    &SendMessage {
                        chat_id: &self.chat_id,
                        text: &message.caption,
                        parse_mode: PARSE_MODE,
                        reply_markup,
                    },
                )
                .await
            }
        }
    }
}

// --- Wire format ---

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

impl<'a> InlineKeyboardMarkup<'a> {
    fn single_button(text: &'a str, url: &'a str) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineKeyboardButton { text, url }]],
        }
    }
}

#[derive(Debug, Serialize)]
struct SendPhoto<'a> {
    chat_id: &'a str,
    photo: &'a str,
    caption: &'a str,
    parse_mode: &'a str,
    reply_markup: InlineKeyboardMarkup<'a>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    reply_markup: InlineKeyboardMarkup<'a>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}
