//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → BalancerManager builds one strategy per balancer
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → BalancerManager::apply_reload swaps weight tables
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Reloaded weights only reach peers created after the swap

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::BalancerConfig;
pub use schema::BalancerGroupConfig;
pub use schema::ObservabilityConfig;
pub use schema::ObservatoryConfig;
pub use schema::StrategyConfig;
pub use schema::StrategyWeight;
