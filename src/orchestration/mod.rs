//! # Orchestration
//!
//! Dependency-aware resolution on top of the registries and the promise cache.
//!
//! ## Core Components
//!
//! - **Resolver**: resolves a name, recursing into its requirements
//! - **StrategyRunner**: fetches a single URL through the strategy chain with fallback
//! - **error_classifier**: demotes a requirement's rejection to the dependent's rejection

pub mod error_classifier;
pub mod resolver;
pub mod strategy_runner;

pub use error_classifier::classify_requirement_failure;
pub use resolver::Resolver;
pub use strategy_runner::{ChainOutcome, StrategyRunner};
