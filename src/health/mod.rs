//! Health observation subsystem.
//!
//! # Data Flow
//! ```text
//! Observation producers (probers, passive checks):
//!     → table.rs (per-tag state machine with hysteresis)
//!
//! Strategy pick:
//!     → observer.rs (query Observatory with a deadline, outside any lock)
//!     → state.rs (ObservationResult → alive map / alive list)
//!     → strategy selection
//! ```
//!
//! # Design Decisions
//! - Observation is optional; strategies work without it
//! - Any failure (error, timeout) degrades to "all candidates alive"
//! - Observation failures are logged and counted, never returned to callers

pub mod observer;
pub mod state;
pub mod table;

use std::time::Duration;
use futures_util::future::BoxFuture;
use thiserror::Error;

pub use observer::Observer;
pub use state::{HealthState, ObservationResult, OutboundStatus};
pub use table::HealthTable;

/// Errors an observatory may return from a query.
#[derive(Debug, Error)]
pub enum ObservatoryError {
    /// The observatory has no data to serve yet, or its backend is down.
    #[error("observatory unavailable: {0}")]
    Unavailable(String),

    /// The query did not complete within its deadline.
    #[error("observation timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of outbound liveness reports.
pub trait Observatory: Send + Sync {
    /// Return the latest observation of every tracked outbound.
    fn get_observation(&self) -> BoxFuture<'_, Result<ObservationResult, ObservatoryError>>;
}
