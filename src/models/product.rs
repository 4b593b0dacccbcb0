//! Product record data structure.

use serde::{Deserialize, Serialize};

/// A candidate product returned by one catalog query.
///
/// `id` is the catalog item identifier (ASIN) and is stable for the
/// lifetime of the offer; it is the deduplication key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRecord {
    /// Catalog item identifier (ASIN)
    pub id: String,

    /// Product title
    pub title: String,

    /// Full URL to the product detail page
    pub detail_url: String,

    /// Localized price display string (absent when the listing has no price)
    pub price_display: Option<String>,

    /// Localized saving display string, present only for discounted items
    pub saving_display: Option<String>,

    /// Primary product image URL
    pub image_url: Option<String>,
}
