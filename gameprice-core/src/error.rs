//! Error types for GamePrice

use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum GamePriceError {
    /// A required request field is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configured secrets are missing or were rejected
    #[error("Credential error: {0}")]
    Credential(String),

    /// An upstream API answered with a non-success status
    #[error("Upstream error ({service}, status {status}): {body}")]
    Upstream {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GamePriceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GamePriceError::Validation(msg.into())
    }

    pub fn credential(msg: impl Into<String>) -> Self {
        GamePriceError::Credential(msg.into())
    }

    pub fn upstream(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        GamePriceError::Upstream {
            service: service.into(),
            status,
            body: body.into(),
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        GamePriceError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        GamePriceError::Parse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        GamePriceError::Internal(msg.into())
    }

    /// Whether the error is the caller's fault (maps to HTTP 400)
    pub fn is_client_error(&self) -> bool {
        matches!(self, GamePriceError::Validation(_))
    }
}

/// Result type alias for GamePrice operations
pub type GamePriceResult<T> = Result<T, GamePriceError>;
