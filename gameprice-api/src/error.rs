//! Error → HTTP response mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gameprice_core::GamePriceError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handler error wrapping the workspace error taxonomy
#[derive(Debug)]
pub struct ApiError(pub GamePriceError);

impl From<GamePriceError> for ApiError {
    fn from(e: GamePriceError) -> Self {
        ApiError(e)
    }
}

/// Malformed bodies and wrong content types are validation failures
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(GamePriceError::validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self.0 {
            GamePriceError::Validation(msg) => ErrorResponse {
                error: msg,
                details: None,
            },
            GamePriceError::Upstream {
                service,
                status: upstream_status,
                body,
            } => {
                error!("{} responded with {}: {}", service, upstream_status, body);
                ErrorResponse {
                    error: format!("Upstream {} request failed with status {}", service, upstream_status),
                    details: Some(body),
                }
            }
            other => {
                error!("Request failed: {}", other);
                ErrorResponse {
                    error: other.to_string(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
