//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for outbound balancing.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Outbound tags known to the dispatcher, in declaration order.
    pub outbounds: Vec<String>,

    /// Balancer definitions.
    pub balancers: Vec<BalancerGroupConfig>,

    /// Health observation settings.
    pub observatory: ObservatoryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A named balancer selecting among outbounds by tag prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalancerGroupConfig {
    /// Balancer identifier referenced by routing rules.
    pub tag: String,

    /// Outbound tag prefixes eligible for this balancer.
    #[serde(default)]
    pub selector: Vec<String>,

    /// Outbound used when the strategy has no usable candidate.
    #[serde(default)]
    pub fallback_tag: Option<String>,

    /// Selection strategy (default: random).
    #[serde(default)]
    pub strategy: StrategyConfig,
}

/// Strategy selection, keyed by `type`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum StrategyConfig {
    #[default]
    #[serde(rename = "random")]
    Random,

    #[serde(rename = "roundrobin")]
    RoundRobin,

    #[serde(rename = "wrr")]
    WeightedRoundRobin {
        /// Per-tag weight rules, first match wins.
        #[serde(default)]
        costs: Vec<StrategyWeight>,
    },
}

impl StrategyConfig {
    /// Config-facing name of the strategy.
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyConfig::Random => "random",
            StrategyConfig::RoundRobin => "roundrobin",
            StrategyConfig::WeightedRoundRobin { .. } => "wrr",
        }
    }
}

/// A single weight rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StrategyWeight {
    /// Treat `pattern` as a regular expression instead of a substring.
    #[serde(default)]
    pub regexp: bool,

    /// Substring or pattern matched against the outbound tag.
    #[serde(rename = "match")]
    pub pattern: String,

    /// Weight assigned on match. Zero means "read the number from the tag".
    #[serde(default)]
    pub value: f64,
}

impl StrategyWeight {
    /// Substring rule with a fixed value.
    pub fn substring(pattern: impl Into<String>, value: f64) -> Self {
        Self {
            regexp: false,
            pattern: pattern.into(),
            value,
        }
    }

    /// Regular-expression rule with a fixed value.
    pub fn regex(pattern: impl Into<String>, value: f64) -> Self {
        Self {
            regexp: true,
            pattern: pattern.into(),
            value,
        }
    }
}

/// Health observation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservatoryConfig {
    /// Consult health observations when picking.
    pub enabled: bool,

    /// Upper bound on a single observation query in milliseconds.
    pub timeout_ms: u64,

    /// Number of consecutive failures before marking an outbound dead.
    pub unhealthy_threshold: u32,

    /// Number of consecutive successes before marking an outbound alive.
    pub healthy_threshold: u32,
}

impl Default for ObservatoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 200,
            unhealthy_threshold: 3,
            healthy_threshold: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
