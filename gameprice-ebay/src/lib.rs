//! eBay integration for GamePrice
//!
//! Provides the OAuth client-credentials token cache and a client for the
//! Browse API item search.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{
    grant_from_response, CachedToken, Clock, EbayOAuthExchange, SystemClock, TokenCache,
    TokenExchange, TokenGrant,
    DEFAULT_EXPIRY_SKEW_MS,
};
pub use client::{build_query, EbayClient, MarketplaceAuth, MarketplaceSearch, SEARCH_LIMIT};
pub use types::{ItemSummary, SearchResponse, TokenResponse};
