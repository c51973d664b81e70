//! Weight resolution from configured cost rules.
//!
//! Rules are evaluated in order and the first match wins. A substring rule
//! matches when the tag contains its pattern; a regexp rule matches when the
//! pattern finds anything in the tag. A matching rule with a non-positive
//! value takes its weight from the first number inside the matched text, so
//! `{ regexp = true, match = "x\\d+" }` weighs `node-x3` as 3.

use std::sync::OnceLock;
use dashmap::DashMap;
use regex::Regex;
use crate::config::StrategyWeight;

/// Largest weight a peer can carry. The sum over any realistic candidate set
/// stays far below `i64::MAX`, so round accumulators cannot overflow.
pub const MAX_WEIGHT: i64 = u32::MAX as i64;

/// Tags remembered per manager. Lookups past this keep working uncached.
const CACHE_CAPACITY: usize = 1024;

fn number_regex() -> Option<&'static Regex> {
    static NUMBER_RE: OnceLock<Option<Regex>> = OnceLock::new();
    NUMBER_RE
        .get_or_init(|| Regex::new(r"\d+(\.\d+)?").ok())
        .as_ref()
}

#[derive(Debug)]
enum Pattern {
    Substring(String),
    Regex(Regex),
    /// A pattern that failed to compile never matches.
    Invalid,
}

#[derive(Debug)]
struct WeightRule {
    pattern: Pattern,
    value: f64,
}

impl WeightRule {
    fn new(cost: &StrategyWeight) -> Self {
        let pattern = if cost.regexp {
            match Regex::new(&cost.pattern) {
                Ok(re) => Pattern::Regex(re),
                Err(e) => {
                    tracing::error!(pattern = %cost.pattern, error = %e, "Invalid weight pattern, rule ignored");
                    Pattern::Invalid
                }
            }
        } else {
            Pattern::Substring(cost.pattern.clone())
        };

        Self {
            pattern,
            value: cost.value,
        }
    }

    /// The matched text, if the rule applies to `tag`.
    fn find<'t>(&'t self, tag: &'t str) -> Option<&'t str> {
        match &self.pattern {
            Pattern::Substring(s) => tag.contains(s.as_str()).then_some(s.as_str()),
            Pattern::Regex(re) => re.find(tag).map(|m| m.as_str()),
            Pattern::Invalid => None,
        }
    }
}

/// Resolves outbound tags to weights, caching each answer.
#[derive(Debug)]
pub struct WeightManager {
    rules: Vec<WeightRule>,
    default_weight: f64,
    /// Keyed by outbound tag. Outbounds come from config, and a reload builds
    /// a fresh manager, so the key set stays small; the cap guards the rest.
    cache: DashMap<String, f64>,
}

impl WeightManager {
    pub fn new(costs: &[StrategyWeight], default_weight: f64) -> Self {
        Self {
            rules: costs.iter().map(WeightRule::new).collect(),
            default_weight,
            cache: DashMap::new(),
        }
    }

    /// Raw configured weight of `tag`.
    pub fn get(&self, tag: &str) -> f64 {
        if let Some(weight) = self.cache.get(tag) {
            return *weight;
        }
        let weight = self.find_value(tag);
        if self.cache.len() < CACHE_CAPACITY {
            self.cache.insert(tag.to_string(), weight);
        }
        weight
    }

    /// Integral weight of `tag`, in `1..=MAX_WEIGHT`.
    pub fn resolve(&self, tag: &str) -> i64 {
        let weight = self.get(tag);
        if weight >= MAX_WEIGHT as f64 {
            return MAX_WEIGHT;
        }
        // NaN and negatives cast to 0 or below and hit the floor.
        (weight as i64).max(1)
    }

    fn find_value(&self, tag: &str) -> f64 {
        for rule in &self.rules {
            let Some(matched) = rule.find(tag) else {
                continue;
            };
            if rule.value > 0.0 {
                return rule.value;
            }
            return number_regex()
                .and_then(|re| re.find(matched))
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(self.default_weight);
        }
        self.default_weight
    }
}

impl Default for WeightManager {
    fn default() -> Self {
        Self::new(&[], 1.0)
    }
}
