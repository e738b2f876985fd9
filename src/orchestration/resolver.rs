//! # Resolver
//!
//! Turns a name into a task that settles once the name and everything it
//! requires has loaded.
//!
//! ## Resolution Order
//!
//! ```text
//! resolve(name)
//!     │
//!     ├── empty name ──────────────────────▶ rejected NoValue (not cached)
//!     ├── cached ──────────────────────────▶ existing Task
//!     ├── not a reference ─▶ fetch name as a script URL ─▶ ok | NoRef
//!     └── reference
//!           ├── already loaded ────────────▶ resolved "preload"
//!           └── secondary resources ┐
//!               requirements ───────┴─ join ─▶ primary scripts ─▶ ok | BadResource
//!                                      │ fail
//!                                      ▼
//!                      requirement failure: classified
//!                      own resource failure: as-is
//! ```
//!
//! The reservation for a name happens before any recursive call, so a second
//! `resolve` for the same name while the first is in flight returns the same
//! task. A requirement cycle is not detected: each member waits on a task
//! that is waiting on it, and none of them ever settles.

use crate::cache::CacheSlot;
use crate::error::ErrorKind;
use crate::logging::log_resolution;
use crate::orchestration::error_classifier::classify_requirement_failure;
use crate::orchestration::strategy_runner::{ChainOutcome, StrategyRunner};
use crate::registry::{ResourceDescriptor, ResourceType};
use crate::system_context::LoaderContext;
use crate::task::{Deferred, Task, TaskOutcome, TaskStatus};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{debug, warn};

/// Recursive name resolution over the shared loader context
#[derive(Debug, Clone)]
pub struct Resolver {
    context: Arc<LoaderContext>,
    runner: StrategyRunner,
}

impl Resolver {
    pub fn new(context: Arc<LoaderContext>) -> Self {
        let runner = StrategyRunner::new(Arc::clone(&context));
        Self { context, runner }
    }

    pub fn runner(&self) -> &StrategyRunner {
        &self.runner
    }

    /// Resolve `name`. All bookkeeping up to the first asynchronous step
    /// happens before this returns.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn resolve(&self, name: Option<&str>) -> Task {
        let Some(name) = name.filter(|name| !name.is_empty()) else {
            warn!("⚠️ RESOLUTION: Called without a name");
            return Task::rejected(ErrorKind::NoValue);
        };

        let deferred = match self.context.promises.get_or_reserve(name) {
            CacheSlot::Existing(task) => {
                debug!(key = %name, state = ?task.state(), "♻️ RESOLUTION: Cached");
                return task;
            }
            CacheSlot::Reserved(deferred) => deferred,
        };
        let task = deferred.task();

        match self.context.references.get_descriptor(name) {
            Some(descriptor) => self.resolve_reference(name, descriptor, deferred),
            None => self.resolve_url(name, deferred),
        }

        task
    }

    /// Not a reference: the name itself is a script URL
    fn resolve_url(&self, name: &str, deferred: Deferred) {
        debug!(key = %name, "🔗 RESOLUTION: Not a reference, fetching as script URL");

        let run = self.runner.run_chain(name, &ResourceType::script());
        let key = name.to_string();

        tokio::spawn(async move {
            let outcome = match run.await {
                ChainOutcome::Loaded { .. } => Ok(None),
                ChainOutcome::Exhausted => Err(ErrorKind::NoRef),
            };
            settle(&key, deferred, outcome);
        });
    }

    fn resolve_reference(&self, name: &str, descriptor: ResourceDescriptor, deferred: Deferred) {
        let key = name.to_string();

        if descriptor.is_already_loaded() {
            settle(&key, deferred, Ok(Some(TaskStatus::Preload)));
            return;
        }

        debug!(
            key = %name,
            requirements = ?descriptor.requirements,
            resource_types = ?descriptor.resource_types().collect::<Vec<_>>(),
            "📚 RESOLUTION: Resolving reference"
        );

        // Secondary resources start first so stylesheets land before scripts run
        let mut prerequisites: Vec<BoxFuture<'static, TaskOutcome>> = Vec::new();
        for (resource_type, urls) in descriptor.secondary_resources() {
            for url in urls {
                let fetch = self.runner.fetch_url(url, resource_type);
                prerequisites.push(fetch.into_future());
            }
        }
        for requirement in &descriptor.requirements {
            let requirement = self.resolve(Some(requirement.as_str()));
            prerequisites.push(
                async move {
                    requirement
                        .wait()
                        .await
                        .map_err(classify_requirement_failure)
                }
                .boxed(),
            );
        }

        let runner = self.runner.clone();
        let scripts = descriptor.primary_urls().to_vec();

        tokio::spawn(async move {
            if let Err(kind) = try_join_all(prerequisites).await {
                settle(&key, deferred, Err(kind));
                return;
            }

            let script_type = ResourceType::script();
            let loads = scripts.iter().map(|url| runner.fetch_url(url, &script_type));
            let outcome = crate::task::join_all(loads)
                .await
                .map(|()| None)
                .map_err(|_| ErrorKind::BadResource);
            settle(&key, deferred, outcome);
        });
    }
}

fn settle(key: &str, deferred: Deferred, outcome: TaskOutcome) {
    log_resolution(key, &outcome);
    deferred.settle(outcome);
}
