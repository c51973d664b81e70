//! Deadline-bounded observation queries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use crate::health::state::ObservationResult;
use crate::health::{Observatory, ObservatoryError};
use crate::observability::metrics;

/// An observatory bound to a strategy, queried with a timeout.
#[derive(Clone)]
pub struct Observer {
    observatory: Arc<dyn Observatory>,
    timeout: Duration,
}

impl Observer {
    pub fn new(observatory: Arc<dyn Observatory>, timeout: Duration) -> Self {
        Self {
            observatory,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query the observatory, bounded by the configured timeout.
    pub async fn query(&self) -> Result<ObservationResult, ObservatoryError> {
        match time::timeout(self.timeout, self.observatory.get_observation()).await {
            Ok(result) => result,
            Err(_) => Err(ObservatoryError::Timeout(self.timeout)),
        }
    }

    /// Query the observatory, degrading any failure to `None`.
    ///
    /// Must not be called while holding a strategy lock.
    pub async fn observe(&self) -> Option<ObservationResult> {
        match self.query().await {
            Ok(report) => Some(report),
            Err(e @ ObservatoryError::Timeout(_)) => {
                tracing::warn!(error = %e, "Observation timed out, treating all candidates as alive");
                metrics::record_observation_failure("timeout");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Observation failed, treating all candidates as alive");
                metrics::record_observation_failure("error");
                None
            }
        }
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
