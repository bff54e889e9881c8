//! Marketplace account-deletion notification handshake
//!
//! eBay validates a notification endpoint by sending
//! `GET <endpoint>?challenge_code=<code>` and expecting
//! `hex(SHA-256(challenge_code + verification_token + endpoint_url))` back.
//! Actual deletion notices arrive as POSTs and only need acknowledging: the
//! service keeps no user data.

use gameprice_core::{GamePriceError, GamePriceResult};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Hash the challenge, token and endpoint in that order
pub fn challenge_response(challenge_code: &str, verification_token: &str, endpoint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(challenge_code.as_bytes());
    hasher.update(verification_token.as_bytes());
    hasher.update(endpoint.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct DeletionVerifier {
    verification_token: Option<String>,
    endpoint: Option<String>,
}

impl DeletionVerifier {
    pub fn new(verification_token: Option<String>, endpoint: Option<String>) -> Self {
        Self {
            verification_token: verification_token.filter(|t| !t.is_empty()),
            endpoint: endpoint.filter(|e| !e.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.verification_token.is_some() && self.endpoint.is_some()
    }

    /// Answer a validation challenge
    pub fn respond(&self, challenge_code: &str) -> GamePriceResult<String> {
        match (&self.verification_token, &self.endpoint) {
            (Some(token), Some(endpoint)) => {
                debug!("Answering deletion endpoint challenge");
                Ok(challenge_response(challenge_code, token, endpoint))
            }
            _ => Err(GamePriceError::credential(
                "EBAY_VERIFICATION_TOKEN and EBAY_DELETION_ENDPOINT must be set",
            )),
        }
    }

    /// Acknowledge a notification body; malformed bodies are acknowledged too
    pub fn acknowledge(&self, body: &[u8]) -> Option<DeletionNotice> {
        match serde_json::from_slice::<DeletionNotice>(body) {
            Ok(notice) => {
                info!(
                    "Received account deletion notice {} ({})",
                    notice.notification.notification_id.as_deref().unwrap_or("-"),
                    notice.metadata.topic.as_deref().unwrap_or("unknown topic")
                );
                Some(notice)
            }
            Err(e) => {
                debug!("Unrecognized deletion notification body: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletionNotice {
    #[serde(default)]
    pub metadata: NoticeMetadata,
    #[serde(default)]
    pub notification: Notification,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeMetadata {
    pub topic: Option<String>,
    pub schema_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_id: Option<String>,
    pub event_date: Option<String>,
    pub data: Option<serde_json::Value>,
}
