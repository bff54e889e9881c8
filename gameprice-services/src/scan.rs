//! Scan sequencing: capture → identify → price
//!
//! [`ScanSession`] tracks the phase of the most recent capture:
//!
//! ```text
//! Idle → Identifying → (IdentifyFailed | Identified) → PricingInProgress → (PricingFailed | PricesReady)
//! ```
//!
//! Every capture takes a new [`ScanTicket`]. Completions carrying an older
//! ticket belong to an abandoned capture and are discarded.

use gameprice_core::{GamePriceResult, IdentifiedGame};
use gameprice_vision::GameIdentifier;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::price_service::{PriceReport, PriceService};

/// Sequence number of a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScanTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    Identifying,
    IdentifyFailed { error: String },
    Identified { game: IdentifiedGame },
    PricingInProgress { game: IdentifiedGame },
    PricingFailed { game: IdentifiedGame, error: String },
    PricesReady { game: IdentifiedGame, report: Box<PriceReport> },
}

impl ScanPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Identifying => "identifying",
            ScanPhase::IdentifyFailed { .. } => "identify_failed",
            ScanPhase::Identified { .. } => "identified",
            ScanPhase::PricingInProgress { .. } => "pricing_in_progress",
            ScanPhase::PricingFailed { .. } => "pricing_failed",
            ScanPhase::PricesReady { .. } => "prices_ready",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanPhase::IdentifyFailed { .. }
                | ScanPhase::PricingFailed { .. }
                | ScanPhase::PricesReady { .. }
        )
    }
}

#[derive(Debug)]
struct SessionInner {
    ticket: ScanTicket,
    phase: ScanPhase,
}

/// Phase tracker for one capture surface
#[derive(Debug)]
pub struct ScanSession {
    inner: Mutex<SessionInner>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                ticket: ScanTicket(0),
                phase: ScanPhase::Idle,
            }),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.inner.lock().phase.clone()
    }

    pub fn current_ticket(&self) -> ScanTicket {
        self.inner.lock().ticket
    }

    /// Return to `Idle`, invalidating any in-flight work
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.ticket = ScanTicket(inner.ticket.0 + 1);
        inner.phase = ScanPhase::Idle;
    }

    /// Start a new capture: restart from `Idle` and move to `Identifying`
    pub fn begin(&self) -> ScanTicket {
        let mut inner = self.inner.lock();
        inner.ticket = ScanTicket(inner.ticket.0 + 1);
        inner.phase = ScanPhase::Identifying;
        debug!("Scan {:?} started", inner.ticket);
        inner.ticket
    }

    /// Record the identification result; returns false when discarded
    pub fn complete_identify(&self, ticket: ScanTicket, result: Result<IdentifiedGame, String>) -> bool {
        let mut inner = self.inner.lock();
        if inner.ticket != ticket || inner.phase != ScanPhase::Identifying {
            debug!("Discarding stale identification for {:?}", ticket);
            return false;
        }

        inner.phase = match result {
            Ok(game) => ScanPhase::Identified { game },
            Err(error) => ScanPhase::IdentifyFailed { error },
        };
        true
    }

    /// Move `Identified` to `PricingInProgress`
    ///
    /// Returns the game to price, or `None` when the ticket is stale, the
    /// session is not in `Identified`, or the game is the Unknown sentinel.
    pub fn start_pricing(&self, ticket: ScanTicket) -> Option<IdentifiedGame> {
        let mut inner = self.inner.lock();
        if inner.ticket != ticket {
            return None;
        }

        let game = match &inner.phase {
            ScanPhase::Identified { game } if !game.is_unknown() => game.clone(),
            _ => return None,
        };

        inner.phase = ScanPhase::PricingInProgress { game: game.clone() };
        Some(game)
    }

    /// Record the pricing result; returns false when discarded
    pub fn complete_pricing(&self, ticket: ScanTicket, result: Result<PriceReport, String>) -> bool {
        let mut inner = self.inner.lock();
        if inner.ticket != ticket {
            debug!("Discarding stale prices for {:?}", ticket);
            return false;
        }

        let game = match &inner.phase {
            ScanPhase::PricingInProgress { game } => game.clone(),
            _ => return false,
        };

        inner.phase = match result {
            Ok(report) => ScanPhase::PricesReady {
                game,
                report: Box::new(report),
            },
            Err(error) => ScanPhase::PricingFailed { game, error },
        };
        true
    }
}

/// Result of a full scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub game: IdentifiedGame,
    pub price: Option<PriceReport>,
    /// Set when pricing was attempted and failed
    pub price_error: Option<String>,
    pub phase: &'static str,
}

/// Runs identification and, optionally, pricing for one image
pub struct ScanService {
    identifier: Arc<dyn GameIdentifier>,
    prices: Option<Arc<PriceService>>,
}

impl ScanService {
    pub fn new(identifier: Arc<dyn GameIdentifier>, prices: Option<Arc<PriceService>>) -> Self {
        Self { identifier, prices }
    }

    pub fn identifier(&self) -> &Arc<dyn GameIdentifier> {
        &self.identifier
    }

    /// Identify the image, then price it when asked and possible
    ///
    /// Identification errors are returned; pricing errors are reported in
    /// the outcome so a recognized game is never lost.
    pub async fn scan(
        &self,
        session: &ScanSession,
        image: &[u8],
        mime_type: &str,
        with_price: bool,
    ) -> GamePriceResult<ScanOutcome> {
        let ticket = session.begin();

        let game = match self.identifier.identify(image, mime_type).await {
            Ok(game) => game,
            Err(e) => {
                session.complete_identify(ticket, Err(e.to_string()));
                return Err(e);
            }
        };
        session.complete_identify(ticket, Ok(game.clone()));

        let mut outcome = ScanOutcome {
            game,
            price: None,
            price_error: None,
            phase: "identified",
        };

        let Some(prices) = self.prices.as_ref().filter(|_| with_price) else {
            outcome.phase = session.phase().name();
            return Ok(outcome);
        };

        if let Some(game) = session.start_pricing(ticket) {
            match prices.lookup(&game.title, Some(&game.platform)).await {
                Ok(report) => {
                    session.complete_pricing(ticket, Ok(report.clone()));
                    outcome.price = Some(report);
                }
                Err(e) => {
                    warn!("Pricing failed for {}: {}", game, e);
                    session.complete_pricing(ticket, Err(e.to_string()));
                    outcome.price_error = Some(e.to_string());
                }
            }
        } else {
            info!("Skipping pricing for {}", outcome.game);
        }

        outcome.phase = session.phase().name();
        Ok(outcome)
    }
}
