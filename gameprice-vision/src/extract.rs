//! Tolerant JSON extraction from model output
//!
//! Stages, each usable on its own:
//! 1. [`strip_code_fences`] removes Markdown fence markers
//! 2. [`extract_first_object`] finds the first balanced `{...}` substring
//! 3. [`parse_identified_game`] parses it into an [`IdentifiedGame`]
//! 4. [`identify_from_text`] runs the pipeline and falls back to the sentinel

use gameprice_core::game::{UNKNOWN_PLATFORM, UNKNOWN_TITLE};
use gameprice_core::{GamePriceError, GamePriceResult, IdentifiedGame};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const FENCE: &str = "```";

/// Remove Markdown code-fence markers, keeping the fenced content
///
/// Handles an optional language tag after the opening fence
/// (```` ```json ````). Text without fences is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();

    let Some(open) = text.find(FENCE) else {
        return text;
    };

    let after_open = &text[open + FENCE.len()..];
    let tag_len = after_open
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_open.len());
    let body = &after_open[tag_len..];

    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Return the first balanced-brace substring of `text`
///
/// Braces inside JSON string literals are ignored. Returns `None` when there
/// is no `{` or the first object never closes.
pub fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Raw shape of the model answer; every field is optional and loosely typed
#[derive(Debug, Deserialize)]
struct RawIdentification {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    platform: Option<Value>,
    #[serde(default)]
    year: Option<Value>,
}

fn value_to_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a JSON object into an identified game
///
/// Missing fields take the sentinel's values; a numeric `year` is accepted.
pub fn parse_identified_game(json: &str) -> GamePriceResult<IdentifiedGame> {
    let raw: RawIdentification = serde_json::from_str(json)
        .map_err(|e| GamePriceError::parse(format!("Invalid identification JSON: {}", e)))?;

    Ok(IdentifiedGame {
        title: value_to_text(raw.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        platform: value_to_text(raw.platform).unwrap_or_else(|| UNKNOWN_PLATFORM.to_string()),
        year: value_to_text(raw.year).unwrap_or_default(),
    })
}

/// Full pipeline: never fails, falls back to [`IdentifiedGame::unknown`]
pub fn identify_from_text(text: &str) -> IdentifiedGame {
    let unfenced = strip_code_fences(text);

    let Some(object) = extract_first_object(unfenced) else {
        warn!("No JSON object in model output, using Unknown sentinel");
        debug!("Model output: {}", text);
        return IdentifiedGame::unknown();
    };

    match parse_identified_game(object) {
        Ok(game) => game,
        Err(e) => {
            warn!("{}; using Unknown sentinel", e);
            IdentifiedGame::unknown()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("Here you go:\n```json {\"a\": 1} ```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_first_object() {
        assert_eq!(
            extract_first_object("The answer is {\"title\": \"Halo\"} hope that helps {\"x\": 1}"),
            Some("{\"title\": \"Halo\"}")
        );
        assert_eq!(
            extract_first_object("{\"a\": {\"b\": 2}, \"c\": 3} trailing"),
            Some("{\"a\": {\"b\": 2}, \"c\": 3}")
        );
        assert_eq!(extract_first_object("no json here"), None);
        assert_eq!(extract_first_object("{\"unclosed\": 1"), None);
    }

    #[test]
    fn test_extract_ignores_braces_in_strings() {
        let text = r#"{"title": "Braces } and \" quotes {", "platform": "PC"}"#;
        assert_eq!(extract_first_object(text), Some(text));
    }

    #[test]
    fn test_parse_identified_game() {
        let game =
            parse_identified_game(r#"{"title": "Super Mario 64", "platform": "Nintendo 64", "year": 1996}"#)
                .unwrap();
        assert_eq!(game, IdentifiedGame::new("Super Mario 64", "Nintendo 64", "1996"));

        let partial = parse_identified_game(r#"{"title": "Halo"}"#).unwrap();
        assert_eq!(partial, IdentifiedGame::new("Halo", "Unknown", ""));

        assert!(parse_identified_game("{not json}").is_err());
    }

    #[test]
    fn test_fenced_output_parses_as_unwrapped() {
        let fenced = "```json\n{\"title\": \"Metroid\", \"platform\": \"NES\", \"year\": \"1986\"}\n```";
        let bare = "{\"title\": \"Metroid\", \"platform\": \"NES\", \"year\": \"1986\"}";
        assert_eq!(identify_from_text(fenced), identify_from_text(bare));
        assert_eq!(identify_from_text(fenced).title, "Metroid");
    }

    #[test]
    fn test_non_json_output_yields_sentinel() {
        assert_eq!(
            identify_from_text("Sorry, I can't tell which game this is."),
            IdentifiedGame::unknown()
        );
        assert_eq!(identify_from_text(""), IdentifiedGame::unknown());
        assert_eq!(identify_from_text("{\"title\": }"), IdentifiedGame::unknown());
    }
}
