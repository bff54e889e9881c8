//! Price lookup service
//!
//! Builds the marketplace query for a game, fetches listings and aggregates
//! them into a market-value estimate with per-listing authenticity verdicts.

use gameprice_core::{
    aggregate, AggregatedPriceView, AuthenticityConfig, GamePriceError, GamePriceResult, Listing,
};
use gameprice_ebay::{build_query, MarketplaceSearch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Response contract of a price lookup: the full listing array plus summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceReport {
    pub query: String,
    pub marketplace: String,
    pub prices: Vec<Listing>,
    pub summary: AggregatedPriceView,
}

pub struct PriceService {
    marketplace: Arc<dyn MarketplaceSearch>,
    authenticity: AuthenticityConfig,
}

impl PriceService {
    pub fn new(marketplace: Arc<dyn MarketplaceSearch>, authenticity: AuthenticityConfig) -> Self {
        Self {
            marketplace,
            authenticity,
        }
    }

    pub fn authenticity(&self) -> &AuthenticityConfig {
        &self.authenticity
    }

    /// Look up listings for a game and aggregate them
    #[instrument(skip(self))]
    pub async fn lookup(&self, title: &str, platform: Option<&str>) -> GamePriceResult<PriceReport> {
        if title.trim().is_empty() {
            return Err(GamePriceError::validation("Missing game title"));
        }

        let query = build_query(title, platform.unwrap_or_default());
        if query.is_empty() {
            return Err(GamePriceError::validation("Game title is only a placeholder"));
        }

        let listings = self.marketplace.search(&query).await?;
        let summary = aggregate(&listings, &self.authenticity);

        info!(
            "Priced '{}' on {}: {} listings, average {:.2}, {} flagged",
            query,
            self.marketplace.name(),
            listings.len(),
            summary.average,
            summary.flagged_count()
        );

        Ok(PriceReport {
            query,
            marketplace: self.marketplace.name().to_string(),
            prices: listings,
            summary,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Marketplace fake that records queries and returns canned listings
    pub(crate) struct FakeMarketplace {
        pub listings: Vec<Listing>,
        pub fail_with: Option<u16>,
        pub queries: Mutex<Vec<String>>,
    }

    impl FakeMarketplace {
        pub fn with_listings(listings: Vec<Listing>) -> Arc<Self> {
            Arc::new(Self {
                listings,
                fail_with: None,
                queries: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                listings: Vec::new(),
                fail_with: Some(status),
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MarketplaceSearch for FakeMarketplace {
        async fn search(&self, query: &str) -> GamePriceResult<Vec<Listing>> {
            self.queries.lock().push(query.to_string());
            match self.fail_with {
                Some(status) => Err(GamePriceError::upstream("fake", status, "boom")),
                None => Ok(self.listings.clone()),
            }
        }

        fn name(&self) -> &str {
            "FakeBay"
        }
    }

    pub(crate) fn listing(id: &str, title: &str, price: &str) -> Listing {
        Listing {
            title: title.to_string(),
            price_text: price.to_string(),
            currency: "USD".to_string(),
            condition: Some("Used".to_string()),
            image_url: None,
            item_id: id.to_string(),
            page_url: format!("https://www.ebay.com/itm/{}", id),
            seller_name: None,
        }
    }

    #[tokio::test]
    async fn test_lookup_aggregates_listings() {
        let marketplace = FakeMarketplace::with_listings(vec![
            listing("1", "Chrono Trigger SNES", "$200.00"),
            listing("2", "Chrono Trigger SNES cart", "$180.00"),
            listing("3", "Chrono Trigger repro", "$35.00"),
        ]);
        let service = PriceService::new(marketplace.clone(), AuthenticityConfig::default());

        let report = service.lookup("Chrono Trigger", Some("SNES")).await.unwrap();

        assert_eq!(report.query, "Chrono Trigger SNES");
        assert_eq!(report.marketplace, "FakeBay");
        assert_eq!(report.prices.len(), 3);
        assert_eq!(report.summary.median, Some(180.0));
        assert_eq!(report.summary.flagged_count(), 1);
        assert_eq!(marketplace.queries.lock().as_slice(), ["Chrono Trigger SNES"]);
    }

    #[tokio::test]
    async fn test_lookup_strips_unknown_platform() {
        let marketplace = FakeMarketplace::with_listings(Vec::new());
        let service = PriceService::new(marketplace.clone(), AuthenticityConfig::default());

        let report = service.lookup("Halo", Some("Unknown")).await.unwrap();
        assert_eq!(report.query, "Halo");
        assert!(report.prices.is_empty());
        assert_eq!(report.summary.average, 0.0);
    }

    #[tokio::test]
    async fn test_lookup_requires_title() {
        let marketplace = FakeMarketplace::with_listings(Vec::new());
        let service = PriceService::new(marketplace.clone(), AuthenticityConfig::default());

        let err = service.lookup("  ", Some("SNES")).await.unwrap_err();
        assert!(err.is_client_error());

        let err = service.lookup("Unknown", None).await.unwrap_err();
        assert!(err.is_client_error());

        assert!(marketplace.queries.lock().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_propagates_upstream_error() {
        let service = PriceService::new(FakeMarketplace::failing(503), AuthenticityConfig::default());

        let err = service.lookup("Halo", None).await.unwrap_err();
        assert!(matches!(err, GamePriceError::Upstream { status: 503, .. }));
    }
}
