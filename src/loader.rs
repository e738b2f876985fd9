//! # Loader
//!
//! Public facade over the loader context: the `using` entry point plus access
//! to references, cached tasks, strategies, options, load times and
//! notifications.
//!
//! ## Usage
//!
//! ```rust
//! use dload_core::loader::Loader;
//! use dload_core::registry::ResourceDescriptor;
//! use dload_core::strategies::{MemoryTransport, NullDocumentHost};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let transport = MemoryTransport::new()
//!     .with("/js/base.js", "var base = 1;")
//!     .with("/js/app.js", "var app = base + 1;");
//!
//! let loader = Loader::builder()
//!     .with_transport(Arc::new(transport), Arc::new(NullDocumentHost))
//!     .build()
//!     .unwrap();
//!
//! loader.refs().update([
//!     ("base", ResourceDescriptor::new().script("/js/base.js")),
//!     ("app", ResourceDescriptor::new().script("/js/app.js").requires("base")),
//! ]);
//!
//! assert_eq!(loader.using(["app"]).await, Ok(None));
//! assert!(loader.times().get("/js/base.js").is_some());
//! # });
//! ```

use crate::cache::{LoadTimeRecorder, PromiseCache};
use crate::config::{ConfigManager, LoaderConfig, LoaderOptions, OptionsUpdate};
use crate::constants::{resource_types, strategies};
use crate::error::{ErrorKind, Result};
use crate::events::LoadEvent;
use crate::orchestration::Resolver;
use crate::registry::{ReferenceRegistry, ResourceDescriptor, ResourceType, StrategyTable};
use crate::strategies::{DocumentHost, FetchStrategy, Transport, TransportStrategy};
use crate::system_context::LoaderContext;
use crate::task::{join_all, Deferred, Task};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Handle to a loader; clones share the same context
#[derive(Debug, Clone)]
pub struct Loader {
    context: Arc<LoaderContext>,
    resolver: Resolver,
}

impl Default for Loader {
    fn default() -> Self {
        Self::from_context(LoaderContext::default())
    }
}

impl Loader {
    /// Empty loader: no references, no strategies
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::default()
    }

    /// Loader from a loaded configuration, without any strategies
    pub fn from_config_manager(manager: &ConfigManager) -> Result<Self> {
        Self::builder().with_config(manager.config().clone()).build()
    }

    fn from_context(context: LoaderContext) -> Self {
        let context = Arc::new(context);
        let resolver = Resolver::new(Arc::clone(&context));
        Self { context, resolver }
    }

    /// Resolve every name and settle once all of them have loaded.
    ///
    /// Rejects with the first rejection to arrive. With no names the task is
    /// already resolved. The returned task is not cached.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn using<I, S>(&self, names: I) -> Task
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tasks: Vec<Task> = names
            .into_iter()
            .map(|name| self.resolver.resolve(Some(name.as_ref())))
            .collect();

        if tasks.is_empty() {
            return Task::resolved(None);
        }

        debug!(count = tasks.len(), "🚀 USING: Waiting on resolutions");

        let deferred = Deferred::new(None);
        let task = deferred.task();
        tokio::spawn(async move {
            deferred.settle(join_all(tasks).await.map(|()| None));
        });
        task
    }

    /// Resolve a single name; `None` or an empty name rejects with
    /// [`ErrorKind::NoValue`]
    pub fn resolve(&self, name: Option<&str>) -> Task {
        self.resolver.resolve(name)
    }

    /// Fetch a URL directly through the strategy chain for `resource_type`
    pub fn fetch_url(&self, url: &str, resource_type: impl Into<ResourceType>) -> Task {
        self.resolver.runner().fetch_url(url, &resource_type.into())
    }

    pub fn refs(&self) -> &ReferenceRegistry {
        &self.context.references
    }

    pub fn promises(&self) -> &PromiseCache {
        &self.context.promises
    }

    pub fn strategies(&self) -> &StrategyTable {
        &self.context.strategies
    }

    pub fn times(&self) -> &LoadTimeRecorder {
        &self.context.load_times
    }

    pub fn opts(&self) -> LoaderOptions {
        self.context.options()
    }

    /// Merge the supplied fields into the options and return the result
    pub fn set_opts(&self, update: OptionsUpdate) -> LoaderOptions {
        self.context.update_options(update)
    }

    /// Message for an error code such as `"badreq"`
    pub fn errs(&self, code: &str) -> Option<String> {
        ErrorKind::from_code(code).map(ErrorKind::message)
    }

    /// Every error code with its message
    pub fn all_errs(&self) -> BTreeMap<&'static str, String> {
        ErrorKind::ALL
            .iter()
            .map(|kind| (kind.code(), kind.message()))
            .collect()
    }

    /// Receive a [`LoadEvent`] for every URL that loads from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LoadEvent> {
        self.context.event_publisher.subscribe()
    }

    pub fn context(&self) -> &Arc<LoaderContext> {
        &self.context
    }
}

/// Builder for [`Loader`]
#[derive(Default)]
pub struct LoaderBuilder {
    config: LoaderConfig,
    transport: Option<(Arc<dyn Transport>, Arc<dyn DocumentHost>)>,
    strategies: Vec<(ResourceType, String, Arc<dyn FetchStrategy>)>,
}

impl std::fmt::Debug for LoaderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderBuilder")
            .field("config", &self.config)
            .field("transport", &self.transport.is_some())
            .field(
                "strategies",
                &self
                    .strategies
                    .iter()
                    .map(|(resource_type, name, _)| format!("{resource_type}:{name}"))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl LoaderBuilder {
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.config.options = options;
        self
    }

    /// Seed the bundled `jquery` and `ui` references
    pub fn with_default_references(mut self) -> Self {
        self.config.include_default_references = true;
        self
    }

    pub fn with_reference(
        mut self,
        name: impl Into<String>,
        descriptor: ResourceDescriptor,
    ) -> Self {
        self.config.references.insert(name.into(), descriptor);
        self
    }

    /// Treat `key` as already loaded
    pub fn preloaded(mut self, key: impl Into<String>) -> Self {
        self.config.preloaded.push(key.into());
        self
    }

    /// Register the built-in transport strategy for scripts and styles
    pub fn with_transport(
        mut self,
        transport: Arc<dyn Transport>,
        host: Arc<dyn DocumentHost>,
    ) -> Self {
        self.transport = Some((transport, host));
        self
    }

    /// Register an additional strategy. Strategies added here are tried
    /// before the transport strategy, newest first.
    pub fn with_strategy<S>(
        mut self,
        resource_type: impl Into<ResourceType>,
        name: impl Into<String>,
        strategy: S,
    ) -> Self
    where
        S: FetchStrategy,
    {
        self.strategies
            .push((resource_type.into(), name.into(), Arc::new(strategy)));
        self
    }

    pub fn build(self) -> Result<Loader> {
        let context = LoaderContext::from_config(&self.config)?;

        if let Some((transport, host)) = self.transport {
            let strategy: Arc<dyn FetchStrategy> =
                Arc::new(TransportStrategy::new(transport, host));
            for resource_type in [resource_types::SCRIPT, resource_types::STYLE] {
                context
                    .strategies
                    .register_shared(resource_type, strategies::TRANSPORT, Arc::clone(&strategy));
            }
        }

        for (resource_type, name, strategy) in self.strategies {
            context.strategies.register_shared(resource_type, name, strategy);
        }

        Ok(Loader::from_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{MemoryTransport, NullDocumentHost};
    use crate::task::TaskState;

    #[tokio::test]
    async fn test_using_nothing_resolves_immediately() {
        let loader = Loader::new();
        let task = loader.using(Vec::<String>::new());
        assert_eq!(task.state(), TaskState::Resolved(None));
        assert!(loader.promises().is_empty());
    }

    #[tokio::test]
    async fn test_using_caches_whole_closure() {
        let transport = MemoryTransport::new()
            .with("//ajax.googleapis.com/ajax/libs/jquery/1.9.1/jquery.min.js", "/* jquery */")
            .with("//ajax.googleapis.com/ajax/libs/jqueryui/1.10.2/jquery-ui.min.js", "/* ui */");
        let loader = Loader::builder()
            .with_default_references()
            .with_transport(Arc::new(transport), Arc::new(NullDocumentHost))
            .build()
            .unwrap();

        assert_eq!(loader.using(["ui"]).await, Ok(None));
        assert_eq!(loader.promises().get("ui").unwrap().state(), TaskState::Resolved(None));
        assert_eq!(loader.promises().get("jquery").unwrap().state(), TaskState::Resolved(None));
    }

    #[tokio::test]
    async fn test_errs_lookup() {
        let loader = Loader::new();
        assert_eq!(loader.errs("badreq"), Some(ErrorKind::BadRequirement.message()));
        assert_eq!(loader.errs("nope"), None);
        assert_eq!(loader.all_errs().len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_set_opts_returns_merged_options() {
        let loader = Loader::new();
        let options = loader.set_opts(OptionsUpdate {
            allow_cross_domain: Some(true),
            ..OptionsUpdate::default()
        });
        assert!(options.allow_cross_domain);
        assert!(loader.opts().allow_cross_domain);
    }

    #[test]
    fn test_builder_registers_transport_for_scripts_and_styles() {
        let loader = Loader::builder()
            .with_transport(Arc::new(MemoryTransport::new()), Arc::new(NullDocumentHost))
            .build()
            .unwrap();
        assert_eq!(loader.strategies().names(&ResourceType::script()), vec!["transport"]);
        assert_eq!(loader.strategies().names(&ResourceType::style()), vec!["transport"]);
    }
}
