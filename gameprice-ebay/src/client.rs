//! eBay Browse API client
//!
//! Provides item search for a game title/platform query.

use async_trait::async_trait;
use gameprice_core::{GamePriceError, GamePriceResult, Listing};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::auth::TokenCache;
use crate::types::SearchResponse;

/// Base URL for the eBay REST APIs
const EBAY_API_BASE: &str = "https://api.ebay.com";
const EBAY_SANDBOX_API_BASE: &str = "https://api.sandbox.ebay.com";

/// Maximum number of listings requested per search
pub const SEARCH_LIMIT: u32 = 10;

/// Placeholder the identification step uses for unknown fields
const UNKNOWN_PLACEHOLDER: &str = "Unknown";

/// Build the search query for a game
///
/// Joins title and platform, removes every literal "Unknown" placeholder and
/// normalizes whitespace.
pub fn build_query(title: &str, platform: &str) -> String {
    format!("{} {}", title, platform)
        .replace(UNKNOWN_PLACEHOLDER, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Marketplace search abstraction used by the pricing service
#[async_trait]
pub trait MarketplaceSearch: Send + Sync {
    /// Search listings for a free-text query
    async fn search(&self, query: &str) -> GamePriceResult<Vec<Listing>>;

    /// Marketplace display name
    fn name(&self) -> &str;
}

/// How search requests are authenticated
#[derive(Clone)]
pub enum MarketplaceAuth {
    /// Application token obtained through the client-credentials grant
    ClientCredentials(Arc<TokenCache>),
    /// Pre-issued bearer token (legacy `EBAY_AUTH_TOKEN`)
    Static(String),
}

impl MarketplaceAuth {
    async fn bearer(&self) -> GamePriceResult<String> {
        match self {
            MarketplaceAuth::ClientCredentials(cache) => cache.get_token().await,
            MarketplaceAuth::Static(token) if !token.trim().is_empty() => Ok(token.clone()),
            MarketplaceAuth::Static(_) => {
                Err(GamePriceError::credential("EBAY_AUTH_TOKEN is empty"))
            }
        }
    }

    async fn invalidate(&self) {
        if let MarketplaceAuth::ClientCredentials(cache) = self {
            cache.invalidate().await;
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            MarketplaceAuth::ClientCredentials(_) => "client_credentials",
            MarketplaceAuth::Static(_) => "static_token",
        }
    }
}

/// eBay Browse API client
#[derive(Clone)]
pub struct EbayClient {
    client: Client,
    base_url: String,
    marketplace_id: String,
    auth: MarketplaceAuth,
}

impl EbayClient {
    /// Create a new eBay client
    pub fn new(auth: MarketplaceAuth, use_sandbox: bool) -> Self {
        let base_url = if use_sandbox {
            EBAY_SANDBOX_API_BASE
        } else {
            EBAY_API_BASE
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.to_string(),
            marketplace_id: "EBAY_US".to_string(),
            auth,
        }
    }

    /// Set the `X-EBAY-C-MARKETPLACE-ID` sent with each search
    pub fn with_marketplace_id(mut self, marketplace_id: impl Into<String>) -> Self {
        self.marketplace_id = marketplace_id.into();
        self
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &MarketplaceAuth {
        &self.auth
    }

    /// Search item summaries, returning at most [`SEARCH_LIMIT`] listings
    #[instrument(skip(self))]
    pub async fn search_items(&self, query: &str) -> GamePriceResult<Vec<Listing>> {
        let url = format!("{}/buy/browse/v1/item_summary/search", self.base_url);
        let token = self.auth.bearer().await?;

        debug!("Searching eBay for: {}", query);

        let limit = SEARCH_LIMIT.to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("X-EBAY-C-MARKETPLACE-ID", &self.marketplace_id)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| GamePriceError::network(format!("Failed to search eBay: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                warn!("eBay rejected bearer token, dropping cached token");
                self.auth.invalidate().await;
            }
            return Err(GamePriceError::upstream("ebay", status.as_u16(), body));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| GamePriceError::parse(format!("Failed to parse eBay search response: {}", e)))?;

        let listings: Vec<Listing> = search
            .item_summaries
            .unwrap_or_default()
            .iter()
            .take(SEARCH_LIMIT as usize)
            .map(|item| item.to_listing())
            .collect();

        debug!(
            "eBay returned {} listings (total matches: {:?})",
            listings.len(),
            search.total
        );

        Ok(listings)
    }
}

#[async_trait]
impl MarketplaceSearch for EbayClient {
    async fn search(&self, query: &str) -> GamePriceResult<Vec<Listing>> {
        self.search_items(query).await
    }

    fn name(&self) -> &str {
        "eBay"
    }
}
