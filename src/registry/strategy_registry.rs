//! # Strategy Table
//!
//! Per resource type, an append-only list of named fetch strategies.
//! Registration order is FIFO; trial order is the reverse, so the most recently
//! registered strategy gets the first attempt and earlier ones act as
//! fallbacks.
//!
//! ```rust
//! use dload_core::registry::{ResourceType, StrategyTable};
//! use dload_core::strategies::{from_fn, Attempt};
//!
//! let table = StrategyTable::new();
//! table.register("script", "xhr", from_fn(|_| Ok(Attempt::NotApplicable)));
//! table.register("script", "tag", from_fn(|_| Ok(Attempt::NotApplicable)));
//!
//! let chain: Vec<String> = table
//!     .chain(&ResourceType::script())
//!     .iter()
//!     .map(|entry| entry.name().to_string())
//!     .collect();
//! assert_eq!(chain, vec!["tag", "xhr"]);
//! ```

use super::ResourceType;
use crate::strategies::{Attempt, FetchRequest, FetchStrategy, StrategyError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// A named strategy bound to one resource type
pub struct StrategyEntry {
    name: String,
    resource_type: ResourceType,
    strategy: Arc<dyn FetchStrategy>,
}

impl StrategyEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    pub fn attempt(&self, request: &FetchRequest) -> Result<Attempt, StrategyError> {
        self.strategy.attempt(request)
    }
}

impl std::fmt::Debug for StrategyEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyEntry")
            .field("name", &self.name)
            .field("resource_type", &self.resource_type)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct StrategyTable {
    entries: RwLock<HashMap<ResourceType, Vec<Arc<StrategyEntry>>>>,
}

impl StrategyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy for `resource_type`
    pub fn register<S>(
        &self,
        resource_type: impl Into<ResourceType>,
        name: impl Into<String>,
        strategy: S,
    )
    where
        S: FetchStrategy,
    {
        self.register_shared(resource_type, name, Arc::new(strategy));
    }

    /// Append an already shared strategy, e.g. one instance serving several types
    pub fn register_shared(
        &self,
        resource_type: impl Into<ResourceType>,
        name: impl Into<String>,
        strategy: Arc<dyn FetchStrategy>,
    ) {
        let resource_type = resource_type.into();
        let entry = Arc::new(StrategyEntry {
            name: name.into(),
            resource_type: resource_type.clone(),
            strategy,
        });

        let mut entries = self.entries.write();
        let chain = entries.entry(resource_type.clone()).or_default();
        chain.push(Arc::clone(&entry));

        info!(
            resource_type = %resource_type,
            strategy = entry.name(),
            position = chain.len(),
            "🧩 Fetch strategy registered"
        );
    }

    /// Snapshot of the strategies for a type in trial order (newest first)
    pub fn chain(&self, resource_type: &ResourceType) -> Vec<Arc<StrategyEntry>> {
        self.entries
            .read()
            .get(resource_type)
            .map(|chain| chain.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Strategy names for a type in registration order
    pub fn names(&self, resource_type: &ResourceType) -> Vec<String> {
        self.entries
            .read()
            .get(resource_type)
            .map(|chain| chain.iter().map(|entry| entry.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn supports(&self, resource_type: &ResourceType) -> bool {
        self.entries
            .read()
            .get(resource_type)
            .is_some_and(|chain| !chain.is_empty())
    }

    pub fn registered_types(&self) -> Vec<ResourceType> {
        let mut types: Vec<ResourceType> = self.entries.read().keys().cloned().collect();
        types.sort();
        types
    }
}
