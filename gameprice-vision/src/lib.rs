//! Game identification from photos
//!
//! Sends a captured image to a vision-capable language model and turns its
//! free-text answer into an [`IdentifiedGame`](gameprice_core::IdentifiedGame).
//!
//! Model output is treated as untrusted text: the [`extract`] pipeline pulls
//! the first JSON object out of whatever the model said and falls back to the
//! "Unknown Game" sentinel instead of failing.

pub mod extract;
pub mod gemini;
pub mod image;
pub mod types;

use async_trait::async_trait;
use gameprice_core::{GamePriceResult, IdentifiedGame};

pub use extract::{
    extract_first_object, identify_from_text, parse_identified_game, strip_code_fences,
};
pub use gemini::{GeminiClient, DEFAULT_VISION_MODEL};
pub use image::{decode_data_url, DataUrlError, DecodedImage};

/// Identification adapter abstraction
#[async_trait]
pub trait GameIdentifier: Send + Sync {
    /// Identify the game shown in `image`
    ///
    /// Malformed model output never errors; it yields the Unknown sentinel.
    async fn identify(&self, image: &[u8], mime_type: &str) -> GamePriceResult<IdentifiedGame>;

    /// Whether a model credential is configured
    fn is_configured(&self) -> bool;
}
