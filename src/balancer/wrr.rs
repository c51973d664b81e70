//! Weighted round-robin strategy.
//!
//! Smooth weighted round robin in the style of nginx upstreams: every alive
//! peer gains its effective weight each round and the winner pays back the
//! round total, so a peer of weight `w` out of `T` wins `w/T` of the picks
//! without bursts of the heaviest peer.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use arc_swap::ArcSwap;
use futures_util::future::{BoxFuture, FutureExt};
use crate::balancer::peer::{Peer, PeerRegistry};
use crate::balancer::weight::WeightManager;
use crate::balancer::Strategy;
use crate::config::{StrategyConfig, StrategyWeight};
use crate::health::state::all_alive;
use crate::health::Observer;

/// Weighted round-robin selector.
#[derive(Debug)]
pub struct WeightedRoundRobin {
    weights: ArcSwap<WeightManager>,
    observer: Option<Observer>,
    registry: Mutex<PeerRegistry>,
}

impl WeightedRoundRobin {
    pub fn new(costs: &[StrategyWeight]) -> Self {
        Self {
            weights: ArcSwap::from_pointee(WeightManager::new(costs, 1.0)),
            observer: None,
            registry: Mutex::new(PeerRegistry::new()),
        }
    }

    /// Consult `observer` on every pick.
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Swap in a new weight table. Existing peers keep their weight until
    /// they are evicted and recreated.
    pub fn update_weights(&self, costs: &[StrategyWeight]) {
        self.weights.store(WeightManager::new(costs, 1.0).into());
    }

    /// Resolved weight `tag` would get if its peer were created now.
    pub fn resolve_weight(&self, tag: &str) -> i64 {
        self.weights.load().resolve(tag)
    }

    /// Pick one of `candidates`, or `None` when the caller should fall back.
    pub async fn pick(&self, candidates: &[String]) -> Option<String> {
        let observation = match &self.observer {
            Some(observer) => observer.observe().await,
            None => None,
        };

        let status = match observation {
            Some(report) => report.liveness(candidates),
            None => all_alive(candidates),
        };

        if status.is_empty() {
            return None;
        }

        self.select_peer(&status)
    }

    /// One selection round over an explicit status map (tag → alive).
    pub fn select_peer(&self, status: &BTreeMap<String, bool>) -> Option<String> {
        let weights = self.weights.load();
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.select(status, |tag| weights.resolve(tag))
    }

    /// Snapshot of the peer currently tracked for `tag`.
    pub fn peer(&self, tag: &str) -> Option<Peer> {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.get(tag).cloned()
    }
}

impl Strategy for WeightedRoundRobin {
    fn name(&self) -> &'static str {
        "wrr"
    }

    fn pick_outbound<'a>(&'a self, candidates: &'a [String]) -> BoxFuture<'a, Option<String>> {
        self.pick(candidates).boxed()
    }

    fn reload(&self, config: &StrategyConfig) {
        if let StrategyConfig::WeightedRoundRobin { costs } = config {
            self.update_weights(costs);
        }
    }
}
