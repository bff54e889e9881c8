//! eBay API wire types

use gameprice_core::Listing;
use serde::Deserialize;

/// Response of the OAuth client-credentials grant
///
/// Fields are optional so a partial response can be reported as a
/// credential failure instead of a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    /// Lifetime in seconds
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
}

/// Response of `GET /buy/browse/v1/item_summary/search`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub total: Option<u64>,
    /// Absent when the search matched nothing
    #[serde(default)]
    pub item_summaries: Option<Vec<ItemSummary>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub item_id: String,
    #[serde(default)]
    pub title: String,
    pub price: Option<Amount>,
    pub condition: Option<String>,
    pub image: Option<Image>,
    #[serde(default)]
    pub thumbnail_images: Vec<Image>,
    pub item_web_url: Option<String>,
    pub seller: Option<Seller>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Amount {
    pub value: String,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub username: Option<String>,
    pub feedback_percentage: Option<String>,
}

impl ItemSummary {
    /// Convert to the workspace listing type
    pub fn to_listing(&self) -> Listing {
        let (price_text, currency) = match &self.price {
            Some(amount) => (amount.value.clone(), amount.currency.clone()),
            None => (String::new(), String::new()),
        };

        let image_url = self
            .image
            .as_ref()
            .or_else(|| self.thumbnail_images.first())
            .map(|i| i.image_url.clone());

        Listing {
            title: self.title.clone(),
            price_text,
            currency,
            condition: self.condition.clone(),
            image_url,
            item_id: self.item_id.clone(),
            page_url: self.item_web_url.clone().unwrap_or_default(),
            seller_name: self.seller.as_ref().and_then(|s| s.username.clone()),
        }
    }
}
