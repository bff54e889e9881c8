//! OAuth token cache for the eBay APIs
//!
//! Application tokens come from the client-credentials grant and live for a
//! couple of hours. [`TokenCache`] keeps the current token and refreshes it
//! shortly before it expires.
//!
//! ## Single-flight refresh
//!
//! The cache lock is held for the whole refresh. Concurrent callers that find
//! the token expired queue on the lock and then observe the token written by
//! the first caller, so one expiry costs exactly one exchange.

use async_trait::async_trait;
use gameprice_core::{GamePriceError, GamePriceResult};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::types::TokenResponse;

/// Production OAuth endpoint
pub const EBAY_TOKEN_URL: &str = "https://api.ebay.com/identity/v1/oauth2/token";
pub const EBAY_SANDBOX_TOKEN_URL: &str = "https://api.sandbox.ebay.com/identity/v1/oauth2/token";

/// Scope granting access to the Browse API
pub const EBAY_API_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

/// A cached token is only reused while `now < expires_at - skew`
pub const DEFAULT_EXPIRY_SKEW_MS: i64 = 5_000;

/// Source of wall-clock time in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A freshly issued token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in_secs: u64,
}

/// Performs the credential exchange against the identity provider
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self) -> GamePriceResult<TokenGrant>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at_ms: i64,
}

impl CachedToken {
    pub fn is_fresh(&self, now_ms: i64, skew_ms: i64) -> bool {
        now_ms < self.expires_at_ms - skew_ms
    }
}

/// Client-credentials exchange against eBay's identity endpoint
#[derive(Clone)]
pub struct EbayOAuthExchange {
    client: Client,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: String,
}

impl EbayOAuthExchange {
    /// Create an exchange; missing credentials surface on first use
    pub fn new(client_id: Option<String>, client_secret: Option<String>, use_sandbox: bool) -> Self {
        let token_url = if use_sandbox {
            EBAY_SANDBOX_TOKEN_URL
        } else {
            EBAY_TOKEN_URL
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            token_url: token_url.to_string(),
            client_id: client_id.filter(|s| !s.trim().is_empty()),
            client_secret: client_secret.filter(|s| !s.trim().is_empty()),
            scope: EBAY_API_SCOPE.to_string(),
        }
    }

    /// Override the token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

#[async_trait]
impl TokenExchange for EbayOAuthExchange {
    #[instrument(skip(self), fields(token_url = %self.token_url))]
    async fn exchange(&self) -> GamePriceResult<TokenGrant> {
        let (client_id, client_secret) = match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(GamePriceError::credential(
                    "Missing EBAY_CLIENT_ID or EBAY_CLIENT_SECRET",
                ))
            }
        };

        debug!("Requesting eBay application token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GamePriceError::network(format!("Failed to reach token endpoint: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("eBay token endpoint rejected credentials ({}): {}", status, body);
            return Err(GamePriceError::credential(format!(
                "eBay token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GamePriceError::credential(format!("Invalid token response: {}", e)))?;

        grant_from_response(token)
    }
}

/// Accept a token response only when it carries both a token and a lifetime
pub fn grant_from_response(token: TokenResponse) -> GamePriceResult<TokenGrant> {
    match (token.access_token, token.expires_in) {
        (Some(access_token), Some(expires_in)) if !access_token.is_empty() => Ok(TokenGrant {
            access_token,
            expires_in_secs: expires_in,
        }),
        _ => Err(GamePriceError::credential(
            "Failed to obtain eBay access token: response missing access_token or expires_in",
        )),
    }
}

/// Process-lifetime cache of the marketplace bearer token
pub struct TokenCache {
    exchange: Arc<dyn TokenExchange>,
    clock: Arc<dyn Clock>,
    skew_ms: i64,
    cached: Mutex<Option<CachedToken>>,
    refreshes: AtomicU64,
}

impl TokenCache {
    pub fn new(exchange: Arc<dyn TokenExchange>) -> Self {
        Self::with_clock(exchange, Arc::new(SystemClock))
    }

    pub fn with_clock(exchange: Arc<dyn TokenExchange>, clock: Arc<dyn Clock>) -> Self {
        Self {
            exchange,
            clock,
            skew_ms: DEFAULT_EXPIRY_SKEW_MS,
            cached: Mutex::new(None),
            refreshes: AtomicU64::new(0),
        }
    }

    pub fn with_skew_ms(mut self, skew_ms: i64) -> Self {
        self.skew_ms = skew_ms;
        self
    }

    /// Return a valid token, refreshing it if needed
    pub async fn get_token(&self) -> GamePriceResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(self.clock.now_ms(), self.skew_ms) {
                return Ok(token.value.clone());
            }
            debug!("Cached eBay token expired, refreshing");
        }

        let grant = self.exchange.exchange().await?;
        let lifetime_ms = i64::try_from(grant.expires_in_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let expires_at_ms = self.clock.now_ms().saturating_add(lifetime_ms);

        let refresh_num = self.refreshes.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "Obtained eBay token #{} (expires in {}s)",
            refresh_num, grant.expires_in_secs
        );

        *cached = Some(CachedToken {
            value: grant.access_token.clone(),
            expires_at_ms,
        });

        Ok(grant.access_token)
    }

    /// Drop the cached token so the next call refreshes
    pub async fn invalidate(&self) {
        self.cached.lock().await.take();
    }

    /// Number of exchanges performed so far
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}
