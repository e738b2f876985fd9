//! In-process [`Transport`] backed by a URL to body map.
//!
//! Useful for shipping pre-bundled resources and for exercising the loader
//! without a network.

use super::transport::{Transport, TransportError, TransportRequest};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    bodies: Arc<DashMap<String, String>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemoryTransport::insert`]
    pub fn with(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert(&self, url: impl Into<String>, body: impl Into<String>) {
        self.bodies.insert(url.into(), body.into());
    }

    pub fn remove(&self, url: &str) -> Option<String> {
        self.bodies.remove(url).map(|(_, body)| body)
    }

    /// Every request served so far, in arrival order
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// How many times `url` was requested
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.url == url)
            .count()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn fetch(&self, request: TransportRequest) -> Result<String, TransportError> {
        let url = request.url.clone();
        self.requests.lock().push(request);

        self.bodies
            .get(&url)
            .map(|body| body.value().clone())
            .ok_or(TransportError::NotFound { url })
    }
}
