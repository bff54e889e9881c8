//! GamePrice API Server
//!
//! HTTP API that identifies a photographed video game and prices it on eBay.

mod config;
mod error;
mod routes;

use axum::http::{header, Method};
use gameprice_ebay::{EbayClient, EbayOAuthExchange, MarketplaceAuth, TokenCache};
use gameprice_services::{DeletionVerifier, PriceService, ScanService};
use gameprice_vision::GeminiClient;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

/// Marketplace configuration summary for health reporting
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarketplaceStatus {
    pub configured: bool,
    pub auth_mode: &'static str,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub price_service: Arc<PriceService>,
    pub scan_service: Arc<ScanService>,
    pub deletion: Arc<DeletionVerifier>,
    pub marketplace: MarketplaceStatus,
    /// Default for identification requests that do not say otherwise
    pub identify_with_price: bool,
}

impl AppState {
    /// Wire clients and services from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let market = &config.marketplace;

        let auth = if market.use_static_token() {
            info!("Using static eBay bearer token (EBAY_AUTH_TOKEN)");
            MarketplaceAuth::Static(market.static_token.clone().unwrap_or_default())
        } else {
            if !market.has_client_credentials() {
                warn!("No eBay credentials found - price lookups will fail until EBAY_CLIENT_ID/EBAY_CLIENT_SECRET are set");
            }
            let exchange = EbayOAuthExchange::new(
                market.client_id.clone(),
                market.client_secret.clone(),
                market.use_sandbox,
            );
            MarketplaceAuth::ClientCredentials(Arc::new(TokenCache::new(Arc::new(exchange))))
        };

        let marketplace = MarketplaceStatus {
            configured: market.has_client_credentials() || market.use_static_token(),
            auth_mode: auth.mode(),
        };

        let ebay = EbayClient::new(auth, market.use_sandbox)
            .with_marketplace_id(market.marketplace_id.clone());
        let price_service = Arc::new(PriceService::new(
            Arc::new(ebay),
            config.authenticity.clone(),
        ));

        let vision = GeminiClient::new(config.vision.api_key.clone()).with_model(&config.vision.model);
        if config.vision.api_key.is_none() {
            warn!("No vision model API key found - identification will fail until GEMINI_API_KEY is set");
        }
        let scan_service = Arc::new(ScanService::new(
            Arc::new(vision),
            Some(price_service.clone()),
        ));

        let deletion = Arc::new(DeletionVerifier::new(
            config.deletion.verification_token.clone(),
            config.deletion.endpoint.clone(),
        ));

        Self {
            price_service,
            scan_service,
            deletion,
            marketplace,
            identify_with_price: config.identify_with_price,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gameprice_api=debug")),
        )
        .init();

    info!("Starting GamePrice API");

    let config = AppConfig::from_env()?;
    info!(
        "Authenticity heuristic: ratio {}, {} keywords",
        config.authenticity.median_ratio,
        config.authenticity.keywords.len()
    );

    let state = AppState::from_config(&config);

    // Configure CORS for frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = routes::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
