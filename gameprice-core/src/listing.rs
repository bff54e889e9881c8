//! Marketplace listing representation

use serde::{Deserialize, Serialize};

/// One marketplace search result for a queried game
///
/// Immutable once fetched. `price_text` keeps the marketplace's own
/// formatting; numeric handling happens in [`crate::pricing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub title: String,
    pub price_text: String,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub item_id: String,
    pub page_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
}

impl Listing {
    /// Parsed numeric price, if the price text is usable
    pub fn price(&self) -> Option<f64> {
        crate::pricing::parse_price(&self.price_text)
    }
}
