//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are layered, later ones
//! winning:
//!
//! 1. [`LoaderConfig::default`]
//! 2. an optional file (TOML, JSON or YAML, chosen by extension)
//! 3. `DLOAD__*` environment variables, `__` separating nested keys
//!    (`DLOAD__OPTIONS__LINK_STYLES=true`)
//! 4. the flat option flags (`DLOAD_DEBUG`, `DLOAD_LINK_STYLES`,
//!    `DLOAD_CACHE_SCRIPTS`, `DLOAD_ALLOW_CROSS_DOMAIN`)

use super::{LoaderConfig, OptionsUpdate};
use crate::constants::env;
use crate::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ConfigManager {
    config: LoaderConfig,
    environment: String,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from the process environment only
    pub fn load() -> Result<Arc<ConfigManager>> {
        Self::load_layers(None, None)
    }

    /// Load `path` and apply environment overrides on top
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Arc<ConfigManager>> {
        Self::load_layers(Some(path.as_ref()), None)
    }

    /// Load with an explicit variable map instead of the process environment.
    /// This is useful for testing without modifying global environment variables.
    pub fn load_with_environment(
        path: Option<&Path>,
        variables: HashMap<String, String>,
    ) -> Result<Arc<ConfigManager>> {
        Self::load_layers(path, Some(variables))
    }

    fn load_layers(
        path: Option<&Path>,
        variables: Option<HashMap<String, String>>,
    ) -> Result<Arc<ConfigManager>> {
        let environment = Self::detect_environment();

        debug!(
            environment = %environment,
            path = ?path.map(Path::display),
            "Loading loader configuration"
        );

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(env::CONFIG_PREFIX)
                .prefix_separator(env::CONFIG_SEPARATOR)
                .separator(env::CONFIG_SEPARATOR)
                .try_parsing(true)
                .source(variables.clone()),
        );

        let mut config: LoaderConfig = builder.build()?.try_deserialize()?;

        // Flat DLOAD_* flags win over everything else
        let flags = match &variables {
            Some(variables) => OptionsUpdate::from_lookup(|name| variables.get(name).cloned())?,
            None => OptionsUpdate::from_lookup(|name| std::env::var(name).ok())?,
        };
        if !flags.is_empty() {
            debug!(flags = ?flags, "Applying flag overrides");
            config.options.merge(flags);
        }
        config.validate()?;

        info!(
            environment = %environment,
            references = config.references.len(),
            preloaded = config.preloaded.len(),
            debug = config.options.debug,
            "⚙️ Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment,
            source: path.map(Path::to_path_buf),
        }))
    }

    /// Current environment name from `DLOAD_ENV`, then `APP_ENV`, defaulting
    /// to "development"
    pub fn detect_environment() -> String {
        std::env::var(env::ENVIRONMENT)
            .or_else(|_| std::env::var(env::FALLBACK_ENVIRONMENT))
            .unwrap_or_else(|_| "development".to_string())
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// File the configuration was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("environment", &self.environment)
            .field("source", &self.source)
            .field("references", &self.config.references.len())
            .finish()
    }
}
