//! Price lookup endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use gameprice_core::GamePriceError;
use gameprice_services::PriceReport;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct PriceRequest {
    title: Option<String>,
    platform: Option<String>,
}

/// Look up marketplace listings for a game
///
/// Responds with the full listing array (`prices`) plus the aggregated
/// summary with per-listing authenticity verdicts.
async fn get_price(
    State(state): State<AppState>,
    payload: Result<Json<PriceRequest>, JsonRejection>,
) -> Result<Json<PriceReport>, ApiError> {
    let Json(request) = payload?;
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| GamePriceError::validation("Missing game title"))?;

    info!("Price lookup for {} ({:?})", title, request.platform);

    let report = state
        .price_service
        .lookup(&title, request.platform.as_deref())
        .await?;

    Ok(Json(report))
}

/// Create price routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/get-price", post(get_price))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app, listing, post_json, send};
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_price() {
        let listings = vec![
            listing("1", "EarthBound SNES", "$250.00"),
            listing("2", "EarthBound SNES complete", "$310.00"),
            listing("3", "EarthBound SNES", "$90.00"),
            listing("4", "EarthBound reproduction cart", "$280.00"),
        ];
        let (status, body) = send(
            app(None, listings, false, false),
            post_json("/api/get-price", json!({ "title": "EarthBound", "platform": "SNES" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "EarthBound SNES");
        assert_eq!(body["prices"].as_array().unwrap().len(), 4);
        assert_eq!(body["prices"][0]["priceText"], "$250.00");
        assert_eq!(body["summary"]["median"], 265.0);

        let verdicts: Vec<&str> = body["summary"]["assessments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["verdict"].as_str().unwrap())
            .collect();
        assert_eq!(
            verdicts,
            vec![
                "looks_authentic",
                "looks_authentic",
                "possibly_not_authentic",
                "possibly_not_authentic"
            ]
        );
    }

    #[tokio::test]
    async fn test_get_price_without_results() {
        let (status, body) = send(
            app(None, vec![], false, false),
            post_json("/api/get-price", json!({ "title": "Obscure Game" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["prices"].as_array().unwrap().is_empty());
        assert_eq!(body["summary"]["average"], 0.0);
        assert!(body["summary"]["median"].is_null());
    }

    #[tokio::test]
    async fn test_missing_title_is_bad_request() {
        let (status, body) = send(
            app(None, vec![], false, false),
            post_json("/api/get-price", json!({ "platform": "SNES" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing game title");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_server_error() {
        let (status, body) = send(
            app(None, vec![], true, false),
            post_json("/api/get-price", json!({ "title": "Halo" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "{\"errors\":[]}");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/get-price")
            .body(Body::from("{\"title\":\"Halo\"}"))
            .unwrap();

        let (status, body) = send(app(None, vec![], false, false), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Content-Type"));
    }
}
