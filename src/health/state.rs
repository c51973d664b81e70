//! Outbound health state and observation reports.
//!
//! # States
//! - Unknown: tracked but not yet past a threshold, treated as alive
//! - Healthy: outbound receives traffic
//! - Unhealthy: outbound excluded from balancing
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive failures >= unhealthy_threshold
//! Unhealthy → Healthy: consecutive successes >= healthy_threshold
//! ```

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Health State enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthState {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthState {
    /// Unknown counts as alive until proven otherwise.
    pub fn is_alive(self) -> bool {
        self != HealthState::Unhealthy
    }
}

/// Observed status of a single outbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundStatus {
    pub outbound_tag: String,
    pub alive: bool,
    /// Last measured round-trip delay, if any probe succeeded.
    pub delay: Option<Duration>,
}

impl OutboundStatus {
    pub fn new(outbound_tag: impl Into<String>, alive: bool) -> Self {
        Self {
            outbound_tag: outbound_tag.into(),
            alive,
            delay: None,
        }
    }
}

/// A point-in-time report from an observatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationResult {
    pub status: Vec<OutboundStatus>,
}

impl ObservationResult {
    pub fn new(status: Vec<OutboundStatus>) -> Self {
        Self { status }
    }

    fn by_tag(&self) -> HashMap<&str, &OutboundStatus> {
        self.status
            .iter()
            .map(|s| (s.outbound_tag.as_str(), s))
            .collect()
    }

    /// Reported liveness of `tag`, or `None` if the report does not mention it.
    pub fn is_alive(&self, tag: &str) -> Option<bool> {
        self.status
            .iter()
            .find(|s| s.outbound_tag == tag)
            .map(|s| s.alive)
    }

    /// Build the status map consumed by weighted round robin.
    ///
    /// Reported-alive candidates map to `true`. Candidates missing from the
    /// report map to `false`, keeping their peer state frozen but excluding
    /// them from selection. Reported-dead candidates are left out entirely,
    /// so their peer state is evicted.
    pub fn liveness(&self, candidates: &[String]) -> BTreeMap<String, bool> {
        let by_tag = self.by_tag();
        let mut peers = BTreeMap::new();
        for candidate in candidates {
            match by_tag.get(candidate.as_str()) {
                Some(status) if status.alive => {
                    peers.insert(candidate.clone(), true);
                }
                Some(_) => {}
                None => {
                    peers.insert(candidate.clone(), false);
                }
            }
        }
        peers
    }

    /// Candidates not reported dead, in input order.
    ///
    /// Used by the unweighted strategies, which give unobserved outbounds
    /// the benefit of the doubt.
    pub fn alive_candidates(&self, candidates: &[String]) -> Vec<String> {
        let by_tag = self.by_tag();
        candidates
            .iter()
            .filter(|c| by_tag.get(c.as_str()).map_or(true, |s| s.alive))
            .cloned()
            .collect()
    }
}

/// Status map with every candidate alive.
pub fn all_alive(candidates: &[String]) -> BTreeMap<String, bool> {
    candidates.iter().map(|c| (c.clone(), true)).collect()
}
