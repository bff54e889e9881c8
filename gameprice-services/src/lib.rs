//! Business logic services for GamePrice
//!
//! Sits between the HTTP layer and the external clients:
//! - [`PriceService`]: marketplace search + aggregation
//! - [`ScanService`]: the capture → identify → price sequence
//! - [`deletion`]: marketplace account-deletion webhook handshake

pub mod deletion;
pub mod price_service;
pub mod scan;

pub use deletion::{challenge_response, DeletionNotice, DeletionVerifier};
pub use price_service::{PriceReport, PriceService};
pub use scan::{ScanOutcome, ScanPhase, ScanService, ScanSession, ScanTicket};
