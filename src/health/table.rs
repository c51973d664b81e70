//! In-memory observatory fed by probe outcomes.
//!
//! # Responsibilities
//! - Track per-outbound health state (Unknown/Healthy/Unhealthy)
//! - Apply hysteresis thresholds to consecutive successes/failures
//! - Serve snapshots through the `Observatory` trait

use std::time::Duration;
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use crate::config::ObservatoryConfig;
use crate::health::state::{HealthState, ObservationResult, OutboundStatus};
use crate::health::{Observatory, ObservatoryError};

#[derive(Debug, Default)]
struct TagHealth {
    state: HealthState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    delay: Option<Duration>,
}

/// Thread-safe health table keyed by outbound tag.
#[derive(Debug)]
pub struct HealthTable {
    entries: DashMap<String, TagHealth>,
    healthy_threshold: u32,
    unhealthy_threshold: u32,
}

impl HealthTable {
    pub fn new(healthy_threshold: u32, unhealthy_threshold: u32) -> Self {
        Self {
            entries: DashMap::new(),
            healthy_threshold: healthy_threshold.max(1),
            unhealthy_threshold: unhealthy_threshold.max(1),
        }
    }

    pub fn from_config(config: &ObservatoryConfig) -> Self {
        Self::new(config.healthy_threshold, config.unhealthy_threshold)
    }

    /// Report a successful probe, with its measured delay.
    pub fn mark_success(&self, tag: &str, delay: Option<Duration>) {
        let mut entry = self.entries.entry(tag.to_string()).or_default();
        entry.consecutive_failures = 0;
        if delay.is_some() {
            entry.delay = delay;
        }

        if entry.state == HealthState::Healthy {
            return;
        }

        entry.consecutive_successes += 1;
        if entry.consecutive_successes >= self.healthy_threshold {
            entry.state = HealthState::Healthy;
            entry.consecutive_successes = 0;
            tracing::info!(outbound = %tag, "Outbound marked healthy");
        }
    }

    /// Report a failed probe.
    pub fn mark_failure(&self, tag: &str) {
        let mut entry = self.entries.entry(tag.to_string()).or_default();
        entry.consecutive_successes = 0;

        if entry.state == HealthState::Unhealthy {
            return;
        }

        entry.consecutive_failures += 1;
        if entry.consecutive_failures >= self.unhealthy_threshold {
            entry.state = HealthState::Unhealthy;
            entry.consecutive_failures = 0;
            entry.delay = None;
            tracing::warn!(outbound = %tag, "Outbound marked unhealthy");
        }
    }

    /// Force a state, bypassing thresholds.
    pub fn set_alive(&self, tag: &str, alive: bool) {
        let mut entry = self.entries.entry(tag.to_string()).or_default();
        entry.state = if alive {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };
        entry.consecutive_failures = 0;
        entry.consecutive_successes = 0;
    }

    /// Stop tracking an outbound; it disappears from future reports.
    pub fn remove(&self, tag: &str) -> bool {
        self.entries.remove(tag).is_some()
    }

    pub fn state(&self, tag: &str) -> Option<HealthState> {
        self.entries.get(tag).map(|e| e.state)
    }

    /// Current report, sorted by tag.
    pub fn snapshot(&self) -> ObservationResult {
        let mut status: Vec<OutboundStatus> = self
            .entries
            .iter()
            .map(|entry| OutboundStatus {
                outbound_tag: entry.key().clone(),
                alive: entry.state.is_alive(),
                delay: entry.delay,
            })
            .collect();
        status.sort_by(|a, b| a.outbound_tag.cmp(&b.outbound_tag));
        ObservationResult::new(status)
    }
}

impl Observatory for HealthTable {
    fn get_observation(&self) -> BoxFuture<'_, Result<ObservationResult, ObservatoryError>> {
        Box::pin(std::future::ready(Ok(self.snapshot())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hysteresis() {
        let table = HealthTable::new(2, 3);

        table.mark_failure("a");
        table.mark_failure("a");
        assert_eq!(table.state("a"), Some(HealthState::Unknown));
        table.mark_failure("a");
        assert_eq!(table.state("a"), Some(HealthState::Unhealthy));

        table.mark_success("a", None);
        assert_eq!(table.state("a"), Some(HealthState::Unhealthy));
        table.mark_success("a", Some(Duration::from_millis(40)));
        assert_eq!(table.state("a"), Some(HealthState::Healthy));
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let table = HealthTable::new(1, 2);
        table.mark_failure("a");
        table.mark_success("a", None);
        table.mark_failure("a");
        assert_eq!(table.state("a"), Some(HealthState::Healthy));
    }

    #[test]
    fn test_snapshot_reports_tracked_tags_only() {
        let table = HealthTable::new(1, 1);
        table.mark_success("b", Some(Duration::from_millis(12)));
        table.set_alive("a", false);
        table.mark_failure("c");
        table.set_alive("c", true);

        let report = table.snapshot();
        let tags: Vec<_> = report.status.iter().map(|s| s.outbound_tag.as_str()).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
        assert_eq!(report.is_alive("a"), Some(false));
        assert_eq!(report.status[1].delay, Some(Duration::from_millis(12)));
        assert_eq!(report.is_alive("c"), Some(true));
        assert_eq!(report.is_alive("d"), None);

        assert!(table.remove("a"));
        assert_eq!(table.snapshot().is_alive("a"), None);
    }

    #[tokio::test]
    async fn test_observatory_impl() {
        let table = HealthTable::new(1, 1);
        table.set_alive("x", true);
        let report = table.get_observation().await.unwrap();
        assert_eq!(report.is_alive("x"), Some(true));
    }
}
