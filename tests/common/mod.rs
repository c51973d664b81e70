//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use futures_util::future::BoxFuture;
use outbound_balancer::balancer::WeightedRoundRobin;
use outbound_balancer::config::StrategyWeight;
use outbound_balancer::health::{
    Observatory, ObservatoryError, ObservationResult, OutboundStatus, Observer,
};

/// Observatory serving a fixed report and counting queries.
#[derive(Default)]
pub struct FakeObservatory {
    pub result: ObservationResult,
    pub queries: AtomicUsize,
}

impl FakeObservatory {
    /// Report every tag in `tags`, alive unless listed in `dead`.
    pub fn reporting(tags: &[String], dead: &[&str]) -> Self {
        let status = tags
            .iter()
            .map(|tag| OutboundStatus::new(tag.clone(), !dead.contains(&tag.as_str())))
            .collect();
        Self {
            result: ObservationResult::new(status),
            queries: AtomicUsize::new(0),
        }
    }
}

impl Observatory for FakeObservatory {
    fn get_observation(&self) -> BoxFuture<'_, Result<ObservationResult, ObservatoryError>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Box::pin(std::future::ready(Ok(self.result.clone())))
    }
}

/// Observatory that always fails.
pub struct FailingObservatory;

impl Observatory for FailingObservatory {
    fn get_observation(&self) -> BoxFuture<'_, Result<ObservationResult, ObservatoryError>> {
        Box::pin(std::future::ready(Err(ObservatoryError::Unavailable(
            "probe backend down".into(),
        ))))
    }
}

/// Tags `tag-0..tag-{n-1}`.
pub fn tags(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("tag-{i}")).collect()
}

/// One exact-match cost rule per tag.
pub fn costs(weights: &[u32]) -> Vec<StrategyWeight> {
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| StrategyWeight::regex(format!("^tag-{i}$"), f64::from(*w)))
        .collect()
}

pub fn observer(observatory: Arc<dyn Observatory>) -> Observer {
    Observer::new(observatory, Duration::from_secs(1))
}

/// Run `times` picks and count the results.
pub async fn count_picks(
    wrr: &WeightedRoundRobin,
    candidates: &[String],
    times: usize,
) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for _ in 0..times {
        if let Some(tag) = wrr.pick(candidates).await {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    counts
}

pub fn expected(entries: &[(&str, usize)]) -> HashMap<String, usize> {
    entries.iter().map(|(t, c)| (t.to_string(), *c)).collect()
}
