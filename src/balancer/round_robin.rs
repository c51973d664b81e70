//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use futures_util::future::{BoxFuture, FutureExt};
use crate::balancer::Strategy;
use crate::health::Observer;

/// Round-robin selector.
/// Stores an internal counter to rotate through alive candidates.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
    observer: Option<Observer>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    pub async fn pick(&self, candidates: &[String]) -> Option<String> {
        let alive = match &self.observer {
            Some(observer) => match observer.observe().await {
                Some(report) => report.alive_candidates(candidates),
                None => candidates.to_vec(),
            },
            None => candidates.to_vec(),
        };

        if alive.is_empty() {
            return None;
        }

        let index = self.counter.fetch_add(1, Ordering::Relaxed) % alive.len();
        alive.into_iter().nth(index)
    }
}

impl Strategy for RoundRobin {
    fn name(&self) -> &'static str {
        "roundrobin"
    }

    fn pick_outbound<'a>(&'a self, candidates: &'a [String]) -> BoxFuture<'a, Option<String>> {
        self.pick(candidates).boxed()
    }
}
