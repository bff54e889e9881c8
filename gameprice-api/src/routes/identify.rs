//! Image identification endpoint

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use gameprice_core::GamePriceError;
use gameprice_services::{PriceReport, ScanSession};
use gameprice_vision::decode_data_url;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Upload limit for identification requests
///
/// Base64 inflates a photo by a third, and phone photos run to several MB.
pub const MAX_IDENTIFY_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyRequest {
    /// Base64 data URL of the captured photo
    image_data: Option<String>,
    /// Overrides the server default for attaching prices
    with_price: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyResponse {
    title: String,
    platform: String,
    year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<PriceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_error: Option<String>,
}

/// Identify the game in a captured photo
async fn identify_game(
    State(state): State<AppState>,
    payload: Result<Json<IdentifyRequest>, JsonRejection>,
) -> Result<Json<IdentifyResponse>, ApiError> {
    let Json(request) = payload?;
    let image_data = request
        .image_data
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| GamePriceError::validation("No image provided"))?;

    let image = decode_data_url(&image_data).map_err(GamePriceError::from)?;
    info!(
        "Identifying game from {} image ({} bytes)",
        image.mime_type,
        image.bytes.len()
    );

    let with_price = request.with_price.unwrap_or(state.identify_with_price);
    let session = ScanSession::new();
    let outcome = state
        .scan_service
        .scan(&session, &image.bytes, &image.mime_type, with_price)
        .await?;

    Ok(Json(IdentifyResponse {
        title: outcome.game.title,
        platform: outcome.game.platform,
        year: outcome.game.year,
        price: outcome.price,
        price_error: outcome.price_error,
    }))
}

/// Create identification routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/identify-game",
        post(identify_game).layer(DefaultBodyLimit::max(MAX_IDENTIFY_BODY_BYTES)),
    )
}
