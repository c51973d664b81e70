//! Metrics collection.
//!
//! # Metrics
//! - `outbound_balancer_picks_total` (counter): picks by balancer, outbound
//! - `outbound_balancer_fallback_total` (counter): fallbacks by balancer
//! - `outbound_balancer_observation_failures_total` (counter): by reason
//! - `outbound_balancer_peers_evicted_total` (counter): WRR peer evictions

use metrics::counter;

pub fn record_pick(balancer: &str, outbound: &str) {
    counter!(
        "outbound_balancer_picks_total",
        "balancer" => balancer.to_string(),
        "outbound" => outbound.to_string()
    )
    .increment(1);
}

pub fn record_fallback(balancer: &str) {
    counter!("outbound_balancer_fallback_total", "balancer" => balancer.to_string()).increment(1);
}

pub fn record_observation_failure(reason: &'static str) {
    counter!("outbound_balancer_observation_failures_total", "reason" => reason).increment(1);
}

pub fn record_peers_evicted(count: usize) {
    counter!("outbound_balancer_peers_evicted_total").increment(count as u64);
}
