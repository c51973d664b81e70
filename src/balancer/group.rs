//! Balancer groups and their manager.
//!
//! # Responsibilities
//! - Select candidate outbounds for a balancer by tag prefix
//! - Apply the balancer's strategy and fallback
//! - Route reloaded configuration to the matching strategies

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use crate::balancer::{build_strategy, Strategy};
use crate::config::{BalancerConfig, BalancerGroupConfig};
use crate::health::{Observatory, Observer};
use crate::observability::metrics;

/// A named balancer: selectors, strategy and fallback.
#[derive(Debug)]
pub struct BalancerGroup {
    tag: String,
    selectors: Vec<String>,
    fallback_tag: Option<String>,
    strategy: Box<dyn Strategy>,
}

impl BalancerGroup {
    pub fn new(config: &BalancerGroupConfig, observer: Option<Observer>) -> Self {
        Self {
            tag: config.tag.clone(),
            selectors: config.selector.iter().filter(|s| !s.is_empty()).cloned().collect(),
            fallback_tag: config.fallback_tag.clone().filter(|t| !t.is_empty()),
            strategy: build_strategy(&config.strategy, observer),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn fallback_tag(&self) -> Option<&str> {
        self.fallback_tag.as_deref()
    }

    pub fn strategy(&self) -> &dyn Strategy {
        self.strategy.as_ref()
    }

    /// Outbounds whose tag starts with any selector, in input order.
    pub fn candidates(&self, outbounds: &[String]) -> Vec<String> {
        outbounds
            .iter()
            .filter(|tag| self.selectors.iter().any(|s| tag.starts_with(s.as_str())))
            .cloned()
            .collect()
    }

    /// Pick an outbound among `outbounds`, falling back when nothing is usable.
    pub async fn pick_outbound(&self, outbounds: &[String]) -> Option<String> {
        let candidates = self.candidates(outbounds);
        if let Some(tag) = self.strategy.pick_outbound(&candidates).await {
            metrics::record_pick(&self.tag, &tag);
            return Some(tag);
        }

        tracing::debug!(
            balancer = %self.tag,
            candidate_count = candidates.len(),
            fallback = ?self.fallback_tag,
            "No usable candidate, applying fallback"
        );
        let fallback = self.fallback_tag.clone()?;
        metrics::record_fallback(&self.tag);
        Some(fallback)
    }
}

/// Owns every configured balancer.
#[derive(Debug)]
pub struct BalancerManager {
    /// Map of balancer tag -> group.
    groups: HashMap<String, BalancerGroup>,
}

impl BalancerManager {
    /// Create a manager from configuration, optionally backed by an observatory.
    pub fn new(config: &BalancerConfig, observatory: Option<Arc<dyn Observatory>>) -> Self {
        let observer = observatory
            .filter(|_| config.observatory.enabled)
            .map(|o| Observer::new(o, Duration::from_millis(config.observatory.timeout_ms)));

        let groups = config
            .balancers
            .iter()
            .map(|group| {
                tracing::debug!(
                    balancer = %group.tag,
                    strategy = group.strategy.kind(),
                    selectors = ?group.selector,
                    "Balancer configured"
                );
                (group.tag.clone(), BalancerGroup::new(group, observer.clone()))
            })
            .collect();

        Self { groups }
    }

    pub fn get(&self, tag: &str) -> Option<&BalancerGroup> {
        self.groups.get(tag)
    }

    /// Balancer tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Pick an outbound through the balancer `tag`.
    pub async fn pick_outbound(&self, tag: &str, outbounds: &[String]) -> Option<String> {
        match self.groups.get(tag) {
            Some(group) => group.pick_outbound(outbounds).await,
            None => {
                tracing::debug!(balancer = %tag, "Balancer not found");
                None
            }
        }
    }

    /// Push reloaded strategy settings to existing balancers.
    ///
    /// Balancers added or removed by the new config, or whose strategy type
    /// changed, are only picked up by building a new manager.
    pub fn apply_reload(&self, config: &BalancerConfig) {
        for group_config in &config.balancers {
            match self.groups.get(&group_config.tag) {
                Some(group) if group.strategy.name() == group_config.strategy.kind() => {
                    group.strategy.reload(&group_config.strategy);
                    tracing::info!(balancer = %group_config.tag, "Balancer weights reloaded");
                }
                Some(group) => {
                    tracing::warn!(
                        balancer = %group_config.tag,
                        current = group.strategy.name(),
                        requested = group_config.strategy.kind(),
                        "Strategy type change requires restart"
                    );
                }
                None => {
                    tracing::warn!(balancer = %group_config.tag, "New balancer requires restart");
                }
            }
        }
    }
}
