//! Outbound Selection Library
//!
//! Picks one outbound tag per traffic flow out of a balancer's candidate set,
//! weighting the choice by configured costs and live health observations.

pub mod balancer;
pub mod config;
pub mod health;
pub mod observability;

pub use balancer::{BalancerGroup, BalancerManager, Strategy, WeightedRoundRobin};
pub use config::schema::BalancerConfig;
pub use health::{Observatory, Observer};
