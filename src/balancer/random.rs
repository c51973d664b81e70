//! Uniform random strategy.

use futures_util::future::{BoxFuture, FutureExt};
use rand::seq::SliceRandom;
use crate::balancer::Strategy;
use crate::health::Observer;

/// Picks uniformly among alive candidates.
#[derive(Debug, Default)]
pub struct Random {
    observer: Option<Observer>,
}

impl Random {
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

        alive.choose(&mut rand::thread_rng()).cloned()
    }
}

impl Strategy for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick_outbound<'a>(&'a self, candidates: &'a [String]) -> BoxFuture<'a, Option<String>> {
        self.pick(candidates).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use crate::health::HealthTable;

    #[tokio::test]
    async fn test_only_alive_candidates() {
        let table = Arc::new(HealthTable::new(1, 1));
        table.set_alive("a", false);
        let lb = Random::new().with_observer(Observer::new(table, Duration::from_secs(1)));
        let candidates = vec!["a".to_string(), "b".to_string()];

        for _ in 0..20 {
            assert_eq!(lb.pick(&candidates).await.as_deref(), Some("b"));
        }
    }

    #[tokio::test]
    async fn test_empty() {
        assert_eq!(Random::new().pick(&[]).await, None);
    }
}
