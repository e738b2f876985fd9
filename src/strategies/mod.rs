//! # Fetch Strategies
//!
//! A strategy is one way of fetching a URL of a given resource type. Several
//! strategies can be registered per type; the strategy runner tries them from
//! the most recently registered to the first, falling back on failure.
//!
//! ## Contract
//!
//! [`FetchStrategy::attempt`] is called synchronously and answers in one of
//! three ways:
//!
//! - `Ok(Attempt::Pending(future))`: the strategy took the job; the runner
//!   awaits the future. An `Err` from the future moves on to the next strategy.
//! - `Ok(Attempt::NotApplicable)`: the strategy declines this URL.
//! - `Err(StrategyError)`: the strategy failed immediately.
//!
//! Panics inside `attempt` or inside the returned future are contained by the
//! runner and treated like an error.
//!
//! Closures with the right signature are strategies too; [`from_fn`] pins the
//! signature so the closure's argument and return types can be inferred:
//!
//! ```rust
//! use dload_core::strategies::{from_fn, Attempt, FetchStrategy};
//!
//! let decline_all = from_fn(|_request| Ok(Attempt::NotApplicable));
//! let _: &dyn FetchStrategy = &decline_all;
//! ```

pub mod memory;
pub mod transport;

use crate::config::LoaderOptions;
use crate::registry::ResourceType;
use futures::future::BoxFuture;

pub use memory::MemoryTransport;
pub use transport::{
    DocumentHost, HostError, NullDocumentHost, StyleInstall, Transport, TransportError,
    TransportRequest, TransportStrategy,
};

/// Future returned by a strategy that accepted a fetch
pub type StrategyFuture = BoxFuture<'static, Result<(), StrategyError>>;

/// Synchronous answer of a strategy
pub enum Attempt {
    Pending(StrategyFuture),
    NotApplicable,
}

impl Attempt {
    /// Wrap an async block as a pending attempt
    pub fn pending<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<(), StrategyError>> + Send + 'static,
    {
        Attempt::Pending(Box::pin(future))
    }
}

impl std::fmt::Debug for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attempt::Pending(_) => f.write_str("Attempt::Pending(..)"),
            Attempt::NotApplicable => f.write_str("Attempt::NotApplicable"),
        }
    }
}

/// Why a strategy did not deliver
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error("Strategy rejected request: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Strategy panicked: {0}")]
    Panicked(String),
}

/// Everything a strategy is told about a fetch
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub resource_type: ResourceType,
    /// Options in force when the fetch started
    pub options: LoaderOptions,
}

/// A pluggable fetch implementation for one resource type
pub trait FetchStrategy: Send + Sync + 'static {
    fn attempt(&self, request: &FetchRequest) -> Result<Attempt, StrategyError>;
}

impl<F> FetchStrategy for F
where
    F: Fn(&FetchRequest) -> Result<Attempt, StrategyError> + Send + Sync + 'static,
{
    fn attempt(&self, request: &FetchRequest) -> Result<Attempt, StrategyError> {
        self(request)
    }
}

/// Build a strategy from a closure
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&FetchRequest) -> Result<Attempt, StrategyError> + Send + Sync + 'static,
{
    f
}
