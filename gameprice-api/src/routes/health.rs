//! Health check endpoints

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;

use crate::{AppState, MarketplaceStatus};

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    marketplace: MarketplaceStatus,
    vision: IntegrationStatus,
    deletion_webhook: IntegrationStatus,
}

#[derive(Debug, Serialize)]
struct IntegrationStatus {
    configured: bool,
}

/// Health check handler
///
/// Reports "degraded" when an integration is missing credentials.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let vision = state.scan_service.identifier().is_configured();
    let deletion = state.deletion.is_configured();

    let status = if state.marketplace.configured && vision {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        marketplace: state.marketplace,
        vision: IntegrationStatus { configured: vision },
        deletion_webhook: IntegrationStatus {
            configured: deletion,
        },
    })
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
