//! Outbound balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Routing rule names a balancer
//!     → group.rs (filter outbound tags by selector prefixes)
//!     → Apply strategy:
//!         - wrr.rs (smooth weighted round robin, peer.rs + weight.rs)
//!         - round_robin.rs (rotate through alive candidates)
//!         - random.rs (uniform among alive candidates)
//!     → None from the strategy: use the group's fallback tag
//! ```
//!
//! # Design Decisions
//! - Health is queried before any strategy lock is taken
//! - Strategy state lives in memory only; restarts begin from scratch
//! - A strategy never fails; "no usable outbound" is `None`

pub mod group;
pub mod peer;
pub mod random;
pub mod round_robin;
pub mod weight;
pub mod wrr;

use std::fmt;
use futures_util::future::BoxFuture;
use crate::config::StrategyConfig;
use crate::health::Observer;

pub use group::{BalancerGroup, BalancerManager};
pub use random::Random;
pub use round_robin::RoundRobin;
pub use weight::{WeightManager, MAX_WEIGHT};
pub use wrr::WeightedRoundRobin;

/// An outbound selection strategy.
pub trait Strategy: Send + Sync + fmt::Debug {
    /// Config-facing strategy name.
    fn name(&self) -> &'static str;

    /// Pick one of `candidates`; `None` means the caller should fall back.
    fn pick_outbound<'a>(&'a self, candidates: &'a [String]) -> BoxFuture<'a, Option<String>>;

    /// Apply a reloaded strategy configuration where the strategy supports it.
    fn reload(&self, _config: &StrategyConfig) {}
}

/// Build the strategy described by `config`.
pub fn build_strategy(config: &StrategyConfig, observer: Option<Observer>) -> Box<dyn Strategy> {
    match config {
        StrategyConfig::Random => {
            let strategy = Random::new();
            Box::new(match observer {
                Some(o) => strategy.with_observer(o),
                None => strategy,
            })
        }
        StrategyConfig::RoundRobin => {
            let strategy = RoundRobin::new();
            Box::new(match observer {
                Some(o) => strategy.with_observer(o),
                None => strategy,
            })
        }
        StrategyConfig::WeightedRoundRobin { costs } => {
            let strategy = WeightedRoundRobin::new(costs);
            Box::new(match observer {
                Some(o) => strategy.with_observer(o),
                None => strategy,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyWeight;

    #[test]
    fn test_build_strategy_names() {
        assert_eq!(build_strategy(&StrategyConfig::Random, None).name(), "random");
        assert_eq!(build_strategy(&StrategyConfig::RoundRobin, None).name(), "roundrobin");
        let wrr = StrategyConfig::WeightedRoundRobin {
            costs: vec![StrategyWeight::substring("a", 2.0)],
        };
        assert_eq!(build_strategy(&wrr, None).name(), wrr.kind());
    }
}
