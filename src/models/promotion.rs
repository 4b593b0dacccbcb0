//! Daily promotional message records.

use serde::{Deserialize, Serialize};

/// A pre-authored promotional message, published once per day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    /// Promotion name, used for logging
    pub name: String,

    /// Verbatim Markdown caption
    pub text: String,

    /// Affiliate URL; may contain a `{tag}` placeholder
    pub url: String,

    /// Image attached to the message
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Promotion {
    /// Substitute the `{tag}` placeholder in the URL with the associate tag.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.url = self.url.replace("{tag}", tag);
        self
    }
}
