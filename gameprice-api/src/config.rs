//! Server configuration loaded from the environment
//!
//! Every external integration is optional at startup. Missing credentials
//! surface as credential errors on the endpoints that need them.

use gameprice_core::AuthenticityConfig;
use gameprice_vision::DEFAULT_VISION_MODEL;
use std::env;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub marketplace: MarketplaceConfig,
    pub vision: VisionConfig,
    pub deletion: DeletionConfig,
    pub authenticity: AuthenticityConfig,
    /// Include a price lookup in identification responses
    pub identify_with_price: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MarketplaceConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Legacy pre-issued bearer token
    pub static_token: Option<String>,
    pub marketplace_id: String,
    pub use_sandbox: bool,
}

impl MarketplaceConfig {
    pub fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// The static token is only used when client credentials are absent
    pub fn use_static_token(&self) -> bool {
        !self.has_client_credentials() && self.static_token.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Default)]
pub struct DeletionConfig {
    pub verification_token: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| get(*k));

        let server_port = match get("SERVER_PORT") {
            Some(port) => parse_value("SERVER_PORT", &port)?,
            None => DEFAULT_PORT,
        };

        let marketplace = MarketplaceConfig {
            client_id: first(&["EBAY_CLIENT_ID", "EBAY_APP_ID"]),
            client_secret: first(&["EBAY_CLIENT_SECRET", "EBAY_CERT_ID"]),
            static_token: get("EBAY_AUTH_TOKEN"),
            marketplace_id: get("EBAY_MARKETPLACE_ID").unwrap_or_else(|| "EBAY_US".to_string()),
            use_sandbox: match get("EBAY_ENVIRONMENT") {
                Some(env) => env.eq_ignore_ascii_case("sandbox"),
                None => false,
            },
        };

        let vision = VisionConfig {
            api_key: first(&["GEMINI_API_KEY", "AI_API_KEY"]),
            model: get("VISION_MODEL").unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
        };

        let deletion = DeletionConfig {
            verification_token: get("EBAY_VERIFICATION_TOKEN"),
            endpoint: get("EBAY_DELETION_ENDPOINT"),
        };

        let defaults = AuthenticityConfig::default();
        let median_ratio = match get("AUTHENTICITY_RATIO") {
            Some(ratio) => {
                let ratio: f64 = parse_value("AUTHENTICITY_RATIO", &ratio)?;
                if !(0.0..=1.0).contains(&ratio) {
                    return Err(ConfigError::InvalidValue {
                        key: "AUTHENTICITY_RATIO".to_string(),
                        value: ratio.to_string(),
                        reason: "must be between 0 and 1".to_string(),
                    });
                }
                ratio
            }
            None => defaults.median_ratio,
        };
        let authenticity = match get("AUTHENTICITY_KEYWORDS") {
            Some(keywords) => AuthenticityConfig::new(median_ratio, keywords.split(',')),
            None => AuthenticityConfig {
                median_ratio,
                ..defaults
            },
        };

        let identify_with_price = match get("IDENTIFY_WITH_PRICE") {
            Some(flag) => parse_value("IDENTIFY_WITH_PRICE", &flag)?,
            None => false,
        };

        Ok(Self {
            server_port,
            marketplace,
            vision,
            deletion,
            authenticity,
            identify_with_price,
        })
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port, 3001);
        assert_eq!(config.marketplace.marketplace_id, "EBAY_US");
        assert!(!config.marketplace.has_client_credentials());
        assert!(!config.marketplace.use_static_token());
        assert_eq!(config.vision.model, DEFAULT_VISION_MODEL);
        assert_eq!(config.authenticity, AuthenticityConfig::default());
        assert!(!config.identify_with_price);
    }

    #[test]
    fn test_credential_aliases() {
        let config = config_from(&[
            ("EBAY_APP_ID", "app"),
            ("EBAY_CERT_ID", "cert"),
            ("EBAY_AUTH_TOKEN", "legacy"),
            ("AI_API_KEY", "vision"),
        ])
        .unwrap();

        assert_eq!(config.marketplace.client_id.as_deref(), Some("app"));
        assert_eq!(config.marketplace.client_secret.as_deref(), Some("cert"));
        assert!(config.marketplace.has_client_credentials());
        assert!(!config.marketplace.use_static_token());
        assert_eq!(config.vision.api_key.as_deref(), Some("vision"));
    }

    #[test]
    fn test_static_token_fallback() {
        let config = config_from(&[("EBAY_AUTH_TOKEN", "legacy"), ("EBAY_CLIENT_ID", "  ")]).unwrap();
        assert!(config.marketplace.use_static_token());
    }

    #[test]
    fn test_authenticity_overrides() {
        let config = config_from(&[
            ("AUTHENTICITY_RATIO", "0.5"),
            ("AUTHENTICITY_KEYWORDS", "repro, Reproduction ,fake"),
            ("IDENTIFY_WITH_PRICE", "true"),
        ])
        .unwrap();

        assert_eq!(config.authenticity.median_ratio, 0.5);
        assert_eq!(config.authenticity.keywords, vec!["repro", "reproduction", "fake"]);
        assert!(config.identify_with_price);
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("SERVER_PORT", "http")]).is_err());
        assert!(config_from(&[("AUTHENTICITY_RATIO", "1.5")]).is_err());
        assert!(config_from(&[("IDENTIFY_WITH_PRICE", "yes")]).is_err());
    }
}
