//! # Strategy Runner
//!
//! Fetches one URL of one resource type, deduplicated through the promise
//! cache and tried against the registered strategies newest-first.
//!
//! ## Architecture
//!
//! ```text
//! fetch_url(url, type)
//!     │
//!     ├── cached? ─────────────────────────▶ existing Task
//!     │
//!     └── reserve url ─▶ snapshot chain ─▶ spawn
//!                                            │
//!                          ┌─────────────────┘
//!                          ▼
//!               strategy N ──fail──▶ strategy N-1 ──fail──▶ ... ──▶ BadResource
//!                  │ ok                  │ ok
//!                  ▼                     ▼
//!          record load time, publish LoadEvent, resolve
//! ```
//!
//! The chain is snapshotted when the fetch starts, so strategies registered
//! while a fetch is in flight only apply to later fetches.

use crate::cache::CacheSlot;
use crate::error::ErrorKind;
use crate::events::LoadEvent;
use crate::registry::{ResourceType, StrategyEntry};
use crate::strategies::{Attempt, FetchRequest, StrategyError};
use crate::system_context::LoaderContext;
use crate::task::Task;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// How a pass over the strategy chain ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    Loaded { strategy: String, elapsed: Duration },
    Exhausted,
}

impl ChainOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ChainOutcome::Loaded { .. })
    }
}

/// Runs strategy chains against the shared loader context
#[derive(Debug, Clone)]
pub struct StrategyRunner {
    context: Arc<LoaderContext>,
}

impl StrategyRunner {
    pub fn new(context: Arc<LoaderContext>) -> Self {
        Self { context }
    }

    /// Fetch `url` as `resource_type`, returning the cached task when one
    /// exists. The task resolves with no status or rejects with
    /// [`ErrorKind::BadResource`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn fetch_url(&self, url: &str, resource_type: &ResourceType) -> Task {
        let deferred = match self.context.promises.get_or_reserve(url) {
            CacheSlot::Existing(task) => {
                trace!(url = %url, "♻️ Reusing cached fetch");
                return task;
            }
            CacheSlot::Reserved(deferred) => deferred,
        };

        let task = deferred.task();
        let run = self.run_chain(url, resource_type);

        tokio::spawn(async move {
            match run.await {
                ChainOutcome::Loaded { .. } => deferred.resolve(None),
                ChainOutcome::Exhausted => deferred.reject(ErrorKind::BadResource),
            }
        });

        task
    }

    /// Try every strategy for `resource_type` against `url` without touching
    /// the promise cache.
    ///
    /// The chain and options are captured before this returns; the returned
    /// future does the work.
    pub fn run_chain(
        &self,
        url: &str,
        resource_type: &ResourceType,
    ) -> impl Future<Output = ChainOutcome> + Send + 'static {
        let context = Arc::clone(&self.context);
        let chain = context.strategies.chain(resource_type);
        let request = FetchRequest {
            url: url.to_string(),
            resource_type: resource_type.clone(),
            options: context.options(),
        };
        let started = Instant::now();

        if chain.is_empty() {
            warn!(
                url = %url,
                resource_type = %resource_type,
                "⚠️ Unrecognized resource type: no strategies registered"
            );
        } else if request.options.debug {
            info!(
                url = %url,
                resource_type = %resource_type,
                strategies = chain.len(),
                "🔎 FETCH: Starting strategy chain"
            );
        } else {
            trace!(
                url = %url,
                resource_type = %resource_type,
                strategies = chain.len(),
                "Starting strategy chain"
            );
        }

        async move {
            for entry in &chain {
                match attempt(entry, &request).await {
                    Ok(()) => {
                        let elapsed = started.elapsed();
                        context.load_times.record(request.url.clone(), elapsed);
                        context.event_publisher.publish(LoadEvent::resource_loaded(
                            request.resource_type.clone(),
                            request.url.clone(),
                            entry.name(),
                            elapsed,
                        ));
                        info!(
                            url = %request.url,
                            resource_type = %request.resource_type,
                            strategy = entry.name(),
                            elapsed = ?elapsed,
                            "📦 FETCH: Loaded"
                        );
                        return ChainOutcome::Loaded {
                            strategy: entry.name().to_string(),
                            elapsed,
                        };
                    }
                    Err(error) => {
                        if request.options.debug {
                            info!(
                                url = %request.url,
                                strategy = entry.name(),
                                error = %error,
                                "↩️ FETCH: Strategy failed"
                            );
                        } else {
                            debug!(
                                url = %request.url,
                                strategy = entry.name(),
                                error = %error,
                                "↩️ FETCH: Strategy failed"
                            );
                        }
                    }
                }
            }

            if !chain.is_empty() {
                warn!(
                    url = %request.url,
                    resource_type = %request.resource_type,
                    attempted = chain.len(),
                    "❌ FETCH: All strategies exhausted"
                );
            }
            ChainOutcome::Exhausted
        }
    }
}

/// One strategy, with panics from the call or its future contained
async fn attempt(entry: &StrategyEntry, request: &FetchRequest) -> Result<(), StrategyError> {
    let answer = panic::catch_unwind(AssertUnwindSafe(|| entry.attempt(request)))
        .map_err(|payload| StrategyError::Panicked(panic_message(payload.as_ref())))??;

    match answer {
        Attempt::NotApplicable => Err(StrategyError::Rejected(format!(
            "{} does not handle {}",
            entry.name(),
            request.url
        ))),
        Attempt::Pending(future) => AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .map_err(|payload| StrategyError::Panicked(panic_message(payload.as_ref())))?,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{from_fn, FetchStrategy};
    use crate::task::TaskState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn instant() -> impl FetchStrategy {
        from_fn(|_| Ok(Attempt::pending(async { Ok(()) })))
    }

    fn runner() -> (Arc<LoaderContext>, StrategyRunner) {
        let context = Arc::new(LoaderContext::default());
        (Arc::clone(&context), StrategyRunner::new(context))
    }

    #[tokio::test]
    async fn test_newest_strategy_wins() {
        let (context, runner) = runner();
        context.strategies.register("script", "old", instant());
        context.strategies.register("script", "new", instant());

        let outcome = runner.run_chain("/a.js", &ResourceType::script()).await;
        assert!(outcome.is_loaded());
        match outcome {
            ChainOutcome::Loaded { strategy, .. } => assert_eq!(strategy, "new"),
            ChainOutcome::Exhausted => panic!("expected a load"),
        }
        assert!(context.load_times.get("/a.js").is_some());
    }

    #[tokio::test]
    async fn test_falls_back_past_panics_and_declines() {
        let (context, runner) = runner();
        context.strategies.register("script", "good", instant());
        context.strategies.register("script", "declines", from_fn(|_| Ok(Attempt::NotApplicable)));
        context.strategies.register("script", "panics", from_fn(|_| panic!("boom")));

        let task = runner.fetch_url("/b.js", &ResourceType::script());
        assert_eq!(task.await, Ok(None));
    }

    #[tokio::test]
    async fn test_exhausted_chain_rejects_bad_resource() {
        let (context, runner) = runner();
        context.strategies.register(
            "script",
            "fails",
            from_fn(|_| Err(StrategyError::Rejected("nope".to_string()))),
        );

        let outcome = runner.run_chain("/c.js", &ResourceType::script()).await;
        assert!(!outcome.is_loaded());

        let task = runner.fetch_url("/c.js", &ResourceType::script());
        assert_eq!(task.await, Err(ErrorKind::BadResource));
        assert!(context.load_times.get("/c.js").is_none());
    }

    #[tokio::test]
    async fn test_unregistered_type_rejects_bad_resource() {
        let (_context, runner) = runner();
        let task = runner.fetch_url("/d.font", &ResourceType::new("font"));
        assert_eq!(task.await, Err(ErrorKind::BadResource));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_attempt() {
        let (context, runner) = runner();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        context.strategies.register(
            "script",
            "counting",
            from_fn(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Attempt::pending(async { Ok(()) }))
            }),
        );

        let first = runner.fetch_url("/e.js", &ResourceType::script());
        let second = runner.fetch_url("/e.js", &ResourceType::script());
        assert!(first.ptr_eq(&second));
        assert_eq!(first.await, Ok(None));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preloaded_url_skips_strategies() {
        let (context, runner) = runner();
        context.promises.mark_loaded("/f.js");
        let task = runner.fetch_url("/f.js", &ResourceType::script());
        assert_eq!(task.state(), TaskState::Resolved(None));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
