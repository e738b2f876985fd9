#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # DLoad Core
//!
//! Asynchronous, dependency-aware resource loading.
//!
//! ## Overview
//!
//! Callers ask for resources by symbolic name (`"ui"`) or by URL. A reference
//! registry says what a name needs: other names that must load first, plus
//! URLs grouped by resource type. The loader resolves the whole closure,
//! fetches every URL at most once through pluggable per-type strategies, and
//! hands back a [`Task`] that settles once everything requested is ready.
//!
//! ## Architecture
//!
//! ```text
//! Loader::using(names)
//!     │
//!     ▼
//! Resolver ──── ReferenceRegistry   (name → requirements + typed URLs)
//!     │    ──── PromiseCache        (key → Task, at most one per key)
//!     ▼
//! StrategyRunner ── StrategyTable   (type → strategies, newest first)
//!     │          ── LoadTimeRecorder
//!     │          ── LoadEventPublisher
//!     ▼
//! FetchStrategy (e.g. TransportStrategy over a Transport + DocumentHost)
//! ```
//!
//! ## Module Organization
//!
//! - [`loader`] - Entry point and facade
//! - [`orchestration`] - Resolver, strategy runner, failure classification
//! - [`registry`] - Reference registry and strategy table
//! - [`cache`] - Promise cache and load times
//! - [`strategies`] - Strategy contract and the built-in transport strategy
//! - [`task`] - Settle-once tasks
//! - [`config`] - Options and layered configuration
//! - [`events`] - Load notifications
//! - [`error`] - Error kinds and operational errors
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use dload_core::{ErrorKind, Loader, MemoryTransport, NullDocumentHost, ResourceDescriptor};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let transport = MemoryTransport::new().with("/js/charts.js", "var charts = {};");
//! let loader = Loader::builder()
//!     .with_transport(Arc::new(transport), Arc::new(NullDocumentHost))
//!     .with_reference("charts", ResourceDescriptor::new().script("/js/charts.js"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(loader.using(["charts"]).await, Ok(None));
//! assert_eq!(loader.using(["/js/missing.js"]).await, Err(ErrorKind::NoRef));
//! # });
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod loader;
pub mod logging;
pub mod orchestration;
pub mod registry;
pub mod strategies;
pub mod system_context;
pub mod task;

pub use cache::{LoadTimeRecorder, PromiseCache};
pub use config::{ConfigManager, LoaderConfig, LoaderOptions, OptionsUpdate};
pub use error::{ErrorKind, LoaderError, Result};
pub use events::{LoadEvent, LoadEventPublisher};
pub use loader::{Loader, LoaderBuilder};
pub use logging::init_structured_logging;
pub use registry::{ReferenceRegistry, ResourceDescriptor, ResourceType, StrategyTable};
pub use strategies::{
    from_fn, Attempt, DocumentHost, FetchRequest, FetchStrategy, MemoryTransport, NullDocumentHost,
    StrategyError, StyleInstall, Transport, TransportError, TransportRequest, TransportStrategy,
};
pub use system_context::LoaderContext;
pub use task::{join_all, Deferred, Task, TaskOutcome, TaskState, TaskStatus};
