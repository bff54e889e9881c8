//! Decoding of browser-captured images
//!
//! The capture UI posts images as base64 data URLs
//! (`data:image/jpeg;base64,/9j/4AAQ...`).

use base64::Engine;
use gameprice_core::GamePriceError;
use thiserror::Error;

/// Mime type assumed when the payload is bare base64
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("No image provided")]
    Empty,

    #[error("Malformed data URL: {0}")]
    Malformed(String),

    #[error("Unsupported media type: {0}")]
    NotAnImage(String),

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),
}

impl From<DataUrlError> for GamePriceError {
    fn from(e: DataUrlError) -> Self {
        GamePriceError::validation(e.to_string())
    }
}

/// Decode a base64 data URL (or a bare base64 string) into image bytes
pub fn decode_data_url(input: &str) -> Result<DecodedImage, DataUrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DataUrlError::Empty);
    }

    let (mime_type, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| DataUrlError::Malformed("missing ',' separator".to_string()))?;

            let mut parts = meta.split(';');
            let mime_type = parts.next().unwrap_or_default().trim().to_lowercase();
            if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
                return Err(DataUrlError::Malformed("only base64 data URLs are supported".to_string()));
            }
            if !mime_type.starts_with("image/") {
                return Err(DataUrlError::NotAnImage(mime_type));
            }
            (mime_type, payload)
        }
        None => (DEFAULT_MIME_TYPE.to_string(), input),
    };

    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if payload.is_empty() {
        return Err(DataUrlError::Empty);
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| DataUrlError::InvalidBase64(e.to_string()))?;

    Ok(DecodedImage { mime_type, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        let image = decode_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_bare_base64_defaults_to_jpeg() {
        let image = decode_data_url("aGVsbG8=").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes, b"hello".to_vec());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(decode_data_url("   "), Err(DataUrlError::Empty));
        assert_eq!(decode_data_url("data:image/png;base64,"), Err(DataUrlError::Empty));
        assert!(matches!(
            decode_data_url("data:text/plain;base64,aGVsbG8="),
            Err(DataUrlError::NotAnImage(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png,rawbytes"),
            Err(DataUrlError::Malformed(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(DataUrlError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_converts_to_validation_error() {
        let err: GamePriceError = DataUrlError::Empty.into();
        assert!(err.is_client_error());
    }
}
