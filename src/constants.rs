//! # Loader Constants
//!
//! Resource type tags, built-in strategy names, event names and environment
//! variable names shared across the loader.

/// Resource type tags understood out of the box
pub mod resource_types {
    /// Primary "load last" type: fetched only after everything else a
    /// descriptor needs has settled
    pub const SCRIPT: &str = "script";

    /// Fetched alongside requirements so stylesheets are installed before
    /// scripts run
    pub const STYLE: &str = "style";
}

/// Names of strategies shipped with the crate
pub mod strategies {
    pub const TRANSPORT: &str = "transport";
}

/// Load notification event names
pub mod events {
    pub const RESOURCE_LOADED: &str = "resource.loaded";
}

/// Status payloads carried by resolved tasks
pub mod status {
    pub const PRELOAD: &str = "preload";
}

/// Environment variables consulted by configuration and logging
pub mod env {
    pub const ENVIRONMENT: &str = "DLOAD_ENV";
    pub const FALLBACK_ENVIRONMENT: &str = "APP_ENV";
    pub const LOG_FORMAT: &str = "DLOAD_LOG_FORMAT";
    pub const DEBUG: &str = "DLOAD_DEBUG";
    pub const LINK_STYLES: &str = "DLOAD_LINK_STYLES";
    pub const CACHE_SCRIPTS: &str = "DLOAD_CACHE_SCRIPTS";
    pub const ALLOW_CROSS_DOMAIN: &str = "DLOAD_ALLOW_CROSS_DOMAIN";

    /// Prefix for layered configuration overrides (`DLOAD__OPTIONS__DEBUG=true`)
    pub const CONFIG_PREFIX: &str = "DLOAD";
    pub const CONFIG_SEPARATOR: &str = "__";
}

/// Default capacity of the load event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;
