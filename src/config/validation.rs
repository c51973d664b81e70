//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check balancer identity (unique, non-empty tags)
//! - Check weight rules (patterns compile, values in `0..=MAX_WEIGHT`)
//! - Validate observatory ranges (timeout > 0, thresholds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use regex::Regex;
use thiserror::Error;
use crate::balancer::weight::MAX_WEIGHT;
use crate::config::schema::{BalancerConfig, StrategyConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("balancer tag must not be empty")]
    EmptyBalancerTag,

    #[error("duplicate balancer tag '{0}'")]
    DuplicateBalancer(String),

    #[error("balancer '{0}' has no selector")]
    EmptySelector(String),

    #[error("balancer '{balancer}': invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        balancer: String,
        pattern: String,
        reason: String,
    },

    #[error("balancer '{balancer}': invalid weight {value} for '{pattern}'")]
    InvalidWeight {
        balancer: String,
        pattern: String,
        value: f64,
    },

    #[error("observatory {0} must be greater than zero")]
    ZeroObservatorySetting(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for balancer in &config.balancers {
        if balancer.tag.is_empty() {
            errors.push(ValidationError::EmptyBalancerTag);
        } else if !seen.insert(balancer.tag.as_str()) {
            errors.push(ValidationError::DuplicateBalancer(balancer.tag.clone()));
        }

        if balancer.selector.iter().all(|s| s.is_empty()) {
            errors.push(ValidationError::EmptySelector(balancer.tag.clone()));
        }

        if let StrategyConfig::WeightedRoundRobin { costs } = &balancer.strategy {
            for cost in costs {
                if cost.regexp {
                    if let Err(e) = Regex::new(&cost.pattern) {
                        errors.push(ValidationError::InvalidPattern {
                            balancer: balancer.tag.clone(),
                            pattern: cost.pattern.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
                if !(0.0..=MAX_WEIGHT as f64).contains(&cost.value) {
                    errors.push(ValidationError::InvalidWeight {
                        balancer: balancer.tag.clone(),
                        pattern: cost.pattern.clone(),
                        value: cost.value,
                    });
                }
            }
        }
    }

    let observatory = &config.observatory;
    if observatory.timeout_ms == 0 {
        errors.push(ValidationError::ZeroObservatorySetting("timeout_ms"));
    }
    if observatory.healthy_threshold == 0 {
        errors.push(ValidationError::ZeroObservatorySetting("healthy_threshold"));
    }
    if observatory.unhealthy_threshold == 0 {
        errors.push(ValidationError::ZeroObservatorySetting("unhealthy_threshold"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{BalancerGroupConfig, StrategyWeight};

    fn wrr_group(tag: &str, costs: Vec<StrategyWeight>) -> BalancerGroupConfig {
        BalancerGroupConfig {
            tag: tag.to_string(),
            selector: vec!["proxy-".to_string()],
            fallback_tag: None,
            strategy: StrategyConfig::WeightedRoundRobin { costs },
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = BalancerConfig::default();
        config.balancers.push(wrr_group(
            "main",
            vec![
                StrategyWeight::substring("proxy-a", 2.0),
                StrategyWeight::regex(r"^proxy-\d+$", 0.0),
            ],
        ));
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_bad_costs() {
        let mut config = BalancerConfig::default();
        config.balancers.push(wrr_group(
            "main",
            vec![
                StrategyWeight::regex("proxy-(", 1.0),
                StrategyWeight::substring("proxy-b", -2.0),
                StrategyWeight::substring("proxy-c", f64::NAN),
                StrategyWeight::substring("proxy-d", 1e19),
                StrategyWeight::substring("proxy-e", f64::INFINITY),
                StrategyWeight::substring("proxy-f", MAX_WEIGHT as f64),
            ],
        ));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(matches!(errors[0], ValidationError::InvalidPattern { .. }));
        assert!(errors[1..]
            .iter()
            .all(|e| matches!(e, ValidationError::InvalidWeight { .. })));
        assert!(!errors.iter().any(|e| e.to_string().contains("proxy-f")));
    }

    #[test]
    fn test_identity_and_observatory() {
        let mut config = BalancerConfig::default();
        config.balancers.push(wrr_group("", vec![]));
        config.balancers.push(wrr_group("dup", vec![]));
        config.balancers.push(wrr_group("dup", vec![]));
        config.observatory.timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyBalancerTag,
                ValidationError::DuplicateBalancer("dup".to_string()),
                ValidationError::ZeroObservatorySetting("timeout_ms"),
            ]
        );
    }
}
