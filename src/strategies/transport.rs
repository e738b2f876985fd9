//! # Transport-Backed Strategy
//!
//! The default strategy for scripts and styles. Network I/O and document side
//! effects are capabilities supplied by the host application:
//!
//! - [`Transport`] performs the actual request.
//! - [`DocumentHost`] executes fetched scripts and installs stylesheets.
//!
//! The strategy only wires them together and maps the loader options onto
//! each request: `cache_scripts` controls transport caching for scripts,
//! `allow_cross_domain` is forwarded as-is, and `link_styles` chooses between a
//! stylesheet link and inline style content.

use super::{Attempt, FetchRequest, FetchStrategy, StrategyError};
use crate::registry::ResourceType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A single request handed to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportRequest {
    pub url: String,
    pub resource_type: ResourceType,
    /// Whether transport-level caching is permitted
    pub cache: bool,
    /// Whether a cross-origin request is permitted
    pub cross_domain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    #[error("Request for {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Cross-domain request to {url} is not permitted")]
    CrossDomainDenied { url: String },

    #[error("Network error: {0}")]
    Network(String),
}

/// Network capability
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Fetch the body at `request.url`
    async fn fetch(&self, request: TransportRequest) -> Result<String, TransportError>;
}

/// How a fetched stylesheet is put into the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleInstall {
    /// Reference the stylesheet by URL
    Link { url: String },
    /// Embed the fetched content
    Inline { css: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Script {url} failed to execute: {reason}")]
    ScriptFailed { url: String, reason: String },

    #[error("Style could not be installed: {0}")]
    StyleRejected(String),
}

/// Document capability: script execution and style insertion
pub trait DocumentHost: Send + Sync + 'static {
    fn execute_script(&self, url: &str, source: &str) -> Result<(), HostError>;

    fn install_style(&self, install: StyleInstall) -> Result<(), HostError>;
}

/// Host that accepts everything and does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDocumentHost;

impl DocumentHost for NullDocumentHost {
    fn execute_script(&self, _url: &str, _source: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn install_style(&self, _install: StyleInstall) -> Result<(), HostError> {
        Ok(())
    }
}

/// Strategy that fetches through a [`Transport`] and applies the result via a
/// [`DocumentHost`]
#[derive(Clone)]
pub struct TransportStrategy {
    transport: Arc<dyn Transport>,
    host: Arc<dyn DocumentHost>,
}

impl TransportStrategy {
    pub fn new(transport: Arc<dyn Transport>, host: Arc<dyn DocumentHost>) -> Self {
        Self { transport, host }
    }

    fn transport_request(request: &FetchRequest) -> TransportRequest {
        let cache = if request.resource_type.is_primary() {
            request.options.cache_scripts
        } else {
            true
        };

        TransportRequest {
            url: request.url.clone(),
            resource_type: request.resource_type.clone(),
            cache,
            cross_domain: request.options.allow_cross_domain,
        }
    }
}

impl std::fmt::Debug for TransportStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportStrategy")
            .field("transport", &"Arc<dyn Transport>")
            .field("host", &"Arc<dyn DocumentHost>")
            .finish()
    }
}

impl FetchStrategy for TransportStrategy {
    fn attempt(&self, request: &FetchRequest) -> Result<Attempt, StrategyError> {
        let transport = Arc::clone(&self.transport);
        let host = Arc::clone(&self.host);
        let transport_request = Self::transport_request(request);
        let link_styles = request.options.link_styles;

        Ok(Attempt::pending(async move {
            let url = transport_request.url.clone();
            let resource_type = transport_request.resource_type.clone();
            let body = transport.fetch(transport_request).await?;

            if resource_type == ResourceType::script() {
                host.execute_script(&url, &body)?;
            } else if resource_type == ResourceType::style() {
                let install = if link_styles {
                    StyleInstall::Link { url: url.clone() }
                } else {
                    StyleInstall::Inline { css: body }
                };
                host.install_style(install)?;
            }

            debug!(url = %url, resource_type = %resource_type, "📦 Transport fetch applied");
            Ok(())
        }))
    }
}
