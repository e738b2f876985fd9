//! Test doubles for strategies and document hosts.

#![allow(dead_code)] // Each test binary uses a different subset

use dload_core::{
    Attempt, DocumentHost, FetchRequest, FetchStrategy, Loader, MemoryTransport, StrategyError,
    StyleInstall,
};
use dload_core::strategies::HostError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Side effect observed by [`RecordingHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Script { url: String, source: String },
    Style(StyleInstall),
}

/// Document host that records every script execution and style install
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    events: Arc<Mutex<Vec<HostEvent>>>,
    failing_scripts: Arc<Mutex<Vec<String>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make executing `url` fail
    pub fn fail_script(&self, url: &str) {
        self.failing_scripts.lock().push(url.to_string());
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().clone()
    }
}

impl DocumentHost for RecordingHost {
    fn execute_script(&self, url: &str, source: &str) -> Result<(), HostError> {
        if self.failing_scripts.lock().iter().any(|failing| failing == url) {
            return Err(HostError::ScriptFailed {
                url: url.to_string(),
                reason: "ReferenceError".to_string(),
            });
        }
        self.events.lock().push(HostEvent::Script {
            url: url.to_string(),
            source: source.to_string(),
        });
        Ok(())
    }

    fn install_style(&self, install: StyleInstall) -> Result<(), HostError> {
        self.events.lock().push(HostEvent::Style(install));
        Ok(())
    }
}

/// Strategy that counts its invocations per URL and succeeds or fails on
/// demand
#[derive(Debug, Clone)]
pub struct CountingStrategy {
    succeed: bool,
    total: Arc<AtomicUsize>,
    per_url: Arc<Mutex<HashMap<String, usize>>>,
}

impl CountingStrategy {
    pub fn succeeding() -> Self {
        Self::new(true)
    }

    pub fn failing() -> Self {
        Self::new(false)
    }

    fn new(succeed: bool) -> Self {
        Self {
            succeed,
            total: Arc::new(AtomicUsize::new(0)),
            per_url: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.per_url.lock().get(url).copied().unwrap_or(0)
    }
}

impl FetchStrategy for CountingStrategy {
    fn attempt(&self, request: &FetchRequest) -> Result<Attempt, StrategyError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.per_url.lock().entry(request.url.clone()).or_insert(0) += 1;

        let succeed = self.succeed;
        let url = request.url.clone();
        Ok(Attempt::pending(async move {
            tokio::task::yield_now().await;
            if succeed {
                Ok(())
            } else {
                Err(StrategyError::Rejected(format!("refusing {url}")))
            }
        }))
    }
}

/// Loader over a memory transport and a recording host
pub fn memory_loader(bodies: &[(&str, &str)]) -> (Loader, MemoryTransport, RecordingHost) {
    let transport = MemoryTransport::new();
    for (url, body) in bodies {
        transport.insert(*url, *body);
    }
    let host = RecordingHost::new();

    let loader = Loader::builder()
        .with_transport(Arc::new(transport.clone()), Arc::new(host.clone()))
        .build()
        .expect("loader should build");

    (loader, transport, host)
}

/// Loader with one counting strategy registered for scripts and styles
pub fn counting_loader(strategy: &CountingStrategy) -> Loader {
    let loader = Loader::new();
    loader.strategies().register("script", "counting", strategy.clone());
    loader.strategies().register("style", "counting", strategy.clone());
    loader
}
