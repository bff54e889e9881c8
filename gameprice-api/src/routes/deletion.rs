//! eBay marketplace account-deletion webhook

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct ChallengeQuery {
    challenge_code: Option<String>,
}

/// Endpoint validation: answer the challenge hash
async fn verify_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Json<Value>, ApiError> {
    let Some(code) = query.challenge_code.filter(|c| !c.is_empty()) else {
        return Ok(Json(json!({ "status": "ok" })));
    };

    info!("Received eBay endpoint validation challenge");
    let challenge_response = state.deletion.respond(&code)?;

    Ok(Json(json!({ "challengeResponse": challenge_response })))
}

/// Deletion notices are acknowledged without further processing
async fn receive_notice(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    state.deletion.acknowledge(&body);
    Json(json!({ "status": "received" }))
}

/// Create deletion webhook routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/ebay-deletion", get(verify_endpoint).post(receive_notice))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app, get, send, ENDPOINT, VERIFICATION_TOKEN};
    use axum::{body::Body, http::Request, http::StatusCode};
    use gameprice_services::challenge_response;

    #[tokio::test]
    async fn test_challenge() {
        let (status, body) = send(
            app(None, vec![], false, false),
            get("/api/ebay-deletion?challenge_code=a8628072-3d33-45ee-9004-bee86830a22d"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["challengeResponse"],
            challenge_response(
                "a8628072-3d33-45ee-9004-bee86830a22d",
                VERIFICATION_TOKEN,
                ENDPOINT
            )
        );
    }

    #[tokio::test]
    async fn test_get_without_challenge() {
        let (status, body) = send(app(None, vec![], false, false), get("/api/ebay-deletion")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_notice_is_acknowledged() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/ebay-deletion")
            .header("content-type", "application/json")
            .body(Body::from("{\"metadata\":{\"topic\":\"MARKETPLACE_ACCOUNT_DELETION\"}}"))
            .unwrap();

        let (status, body) = send(app(None, vec![], false, false), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "received");
    }
}
