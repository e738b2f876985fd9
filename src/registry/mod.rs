//! # Registry Infrastructure
//!
//! Registries the loader consults while resolving.
//!
//! ## Available Registries
//!
//! - **ReferenceRegistry**: symbolic names to resource descriptors
//! - **StrategyTable**: resource types to ordered fetch strategies
//!
//! ```text
//! Registry Infrastructure
//! ├── ReferenceRegistry   (what a name needs)
//! └── StrategyTable       (how a resource type is fetched)
//! ```

pub mod reference_registry;
pub mod strategy_registry;

pub use reference_registry::{AlreadyLoaded, ReferenceRegistry, ResourceDescriptor, ResourceType};
pub use strategy_registry::{StrategyEntry, StrategyTable};
