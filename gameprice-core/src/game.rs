//! Identified game produced by the vision model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder title used when the model output cannot be understood
pub const UNKNOWN_TITLE: &str = "Unknown Game";

/// Placeholder platform used when the model output cannot be understood
pub const UNKNOWN_PLATFORM: &str = "Unknown";

/// A game as identified from a photo
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifiedGame {
    pub title: String,
    pub platform: String,
    /// Release year as free text ("1996", "" when unknown)
    pub year: String,
}

impl IdentifiedGame {
    pub fn new(
        title: impl Into<String>,
        platform: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            platform: platform.into(),
            year: year.into(),
        }
    }

    /// The sentinel returned when identification output is unusable
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_TITLE, UNKNOWN_PLATFORM, "")
    }

    /// True for the sentinel or a blank title
    ///
    /// An unknown platform alone does not make the game unknown; the title
    /// is still searchable.
    pub fn is_unknown(&self) -> bool {
        let title = self.title.trim();
        title.is_empty() || title == UNKNOWN_TITLE
    }
}

impl Default for IdentifiedGame {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for IdentifiedGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year.is_empty() {
            write!(f, "{} ({})", self.title, self.platform)
        } else {
            write!(f, "{} ({}, {})", self.title, self.platform, self.year)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_unknown() {
        let game = IdentifiedGame::unknown();
        assert_eq!(game.title, "Unknown Game");
        assert_eq!(game.platform, "Unknown");
        assert_eq!(game.year, "");
        assert!(game.is_unknown());
    }

    #[test]
    fn test_known_game() {
        let game = IdentifiedGame::new("Super Mario 64", "Nintendo 64", "1996");
        assert!(!game.is_unknown());
        assert_eq!(game.to_string(), "Super Mario 64 (Nintendo 64, 1996)");
    }

    #[test]
    fn test_unknown_platform_is_still_known() {
        let game = IdentifiedGame::new("Tetris", "Unknown", "");
        assert!(!game.is_unknown());
        assert_eq!(game.to_string(), "Tetris (Unknown)");
    }

    #[test]
    fn test_blank_title_is_unknown() {
        assert!(IdentifiedGame::new("  ", "Game Boy", "1989").is_unknown());
        assert!(IdentifiedGame::new("Unknown Game", "Game Boy", "").is_unknown());
    }
}
