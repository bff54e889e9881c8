//! Gemini vision client

use async_trait::async_trait;
use base64::Engine;
use gameprice_core::{GamePriceError, GamePriceResult, IdentifiedGame};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::extract::identify_from_text;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::GameIdentifier;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";

const IDENTIFY_PROMPT: &str = r#"You are a video game expert. Identify the video game shown in this photo (cartridge, disc, case or box art).

Respond with valid JSON in this exact format:
{"title": "Game title", "platform": "Console or platform", "year": "Release year"}

Use "Unknown" for any field you cannot determine."#;

/// Gemini `generateContent` client used as the identification adapter
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    /// Create a client; without an API key every identification fails
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: GEMINI_API_BASE.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: DEFAULT_VISION_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the image and return the model's raw text answer
    #[instrument(skip(self, image), fields(model = %self.model, bytes = image.len()))]
    pub async fn generate(&self, image: &[u8], mime_type: &str) -> GamePriceResult<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GamePriceError::credential("No vision model API key configured"))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text(IDENTIFY_PROMPT),
                    Part::inline(
                        mime_type,
                        base64::engine::general_purpose::STANDARD.encode(image),
                    ),
                ],
            }],
            generation_config: Some(GenerationConfig { temperature: 0.2 }),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GamePriceError::network(format!("Failed to reach vision model: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GamePriceError::upstream("gemini", status.as_u16(), body));
        }

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GamePriceError::parse(format!("Failed to parse vision response: {}", e)))?;

        let text = generated.text();
        debug!("Vision model answered with {} chars", text.len());
        Ok(text)
    }
}

#[async_trait]
impl GameIdentifier for GeminiClient {
    async fn identify(&self, image: &[u8], mime_type: &str) -> GamePriceResult<IdentifiedGame> {
        let text = self.generate(image, mime_type).await?;
        let game = identify_from_text(&text);
        info!("Identified game: {}", game);
        Ok(game)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
