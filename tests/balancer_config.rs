//! Config-driven balancer behavior.

use std::collections::HashMap;
use std::sync::Arc;
use outbound_balancer::balancer::BalancerManager;
use outbound_balancer::config::loader::parse_config;
use outbound_balancer::health::HealthTable;

mod common;
use common::expected;

const CONFIG: &str = r#"
outbounds = ["proxy-hk-1", "proxy-hk-2", "proxy-jp-4", "direct", "block"]

[observatory]
timeout_ms = 500
healthy_threshold = 1
unhealthy_threshold = 2

[[balancers]]
tag = "weighted"
selector = ["proxy-"]
fallback_tag = "direct"

[balancers.strategy]
type = "wrr"

[[balancers.strategy.costs]]
match = "hk-1"
value = 2

[[balancers.strategy.costs]]
regexp = true
match = "jp-\\d+"

[[balancers]]
tag = "rotate"
selector = ["proxy-hk"]
strategy = { type = "roundrobin" }
"#;

fn outbounds(config: &outbound_balancer::BalancerConfig) -> Vec<String> {
    config.outbounds.clone()
}

async fn count(manager: &BalancerManager, tag: &str, outbounds: &[String], times: usize) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for _ in 0..times {
        if let Some(picked) = manager.pick_outbound(tag, outbounds).await {
            *counts.entry(picked).or_insert(0) += 1;
        }
    }
    counts
}

#[tokio::test]
async fn test_weighted_balancer_from_config() {
    let config = parse_config(CONFIG).unwrap();
    let table = Arc::new(HealthTable::from_config(&config.observatory));
    for tag in &config.outbounds {
        table.mark_success(tag, None);
    }
    let manager = BalancerManager::new(&config, Some(table));

    // hk-1 = 2, hk-2 = 1 (default), jp-4 = 4 (number in matched text).
    let counts = count(&manager, "weighted", &outbounds(&config), 14).await;
    assert_eq!(
        counts,
        expected(&[("proxy-hk-1", 4), ("proxy-hk-2", 2), ("proxy-jp-4", 8)])
    );
}

#[tokio::test]
async fn test_dead_outbounds_fall_back() {
    let config = parse_config(CONFIG).unwrap();
    let table = Arc::new(HealthTable::from_config(&config.observatory));
    for tag in &config.outbounds {
        table.mark_success(tag, None);
    }
    let manager = BalancerManager::new(&config, Some(table.clone()));

    for tag in ["proxy-hk-1", "proxy-hk-2", "proxy-jp-4"] {
        table.mark_failure(tag);
        table.mark_failure(tag);
    }

    let picked = manager.pick_outbound("weighted", &outbounds(&config)).await;
    assert_eq!(picked.as_deref(), Some("direct"));

    // No fallback configured for the round-robin balancer.
    assert_eq!(manager.pick_outbound("rotate", &outbounds(&config)).await, None);

    table.mark_success("proxy-hk-2", None);
    let picked = manager.pick_outbound("rotate", &outbounds(&config)).await;
    assert_eq!(picked.as_deref(), Some("proxy-hk-2"));
}

#[tokio::test]
async fn test_untracked_outbound_excluded_by_wrr_only() {
    let config = parse_config(CONFIG).unwrap();
    let table = Arc::new(HealthTable::from_config(&config.observatory));
    table.mark_success("proxy-hk-1", None);
    let manager = BalancerManager::new(&config, Some(table));

    let weighted = count(&manager, "weighted", &outbounds(&config), 6).await;
    assert_eq!(weighted, expected(&[("proxy-hk-1", 6)]));

    let rotate = count(&manager, "rotate", &outbounds(&config), 4).await;
    assert_eq!(rotate, expected(&[("proxy-hk-1", 2), ("proxy-hk-2", 2)]));
}

#[tokio::test]
async fn test_observatory_disabled_ignores_health() {
    let mut config = parse_config(CONFIG).unwrap();
    config.observatory.enabled = false;
    let table = Arc::new(HealthTable::from_config(&config.observatory));
    table.set_alive("proxy-jp-4", false);
    let manager = BalancerManager::new(&config, Some(table));

    let counts = count(&manager, "weighted", &outbounds(&config), 7).await;
    assert_eq!(
        counts,
        expected(&[("proxy-hk-1", 2), ("proxy-hk-2", 1), ("proxy-jp-4", 4)])
    );
}
