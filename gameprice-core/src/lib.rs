//! Core types for GamePrice
//!
//! This crate defines the shared data structures used across the workspace,
//! including identified games, marketplace listings, the error taxonomy and
//! the price aggregation / authenticity heuristic.

pub mod error;
pub mod game;
pub mod listing;
pub mod pricing;

pub use error::{GamePriceError, GamePriceResult};
pub use game::IdentifiedGame;
pub use listing::Listing;
pub use pricing::{
    aggregate, average, median, parse_price, AggregatedPriceView, Authenticity,
    AuthenticityConfig, FlagReason, ListingAssessment,
};
