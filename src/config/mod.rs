//! # Configuration
//!
//! Loader options plus a declarative reference table.
//!
//! ## Overview
//!
//! [`LoaderOptions`] are the four switches the engine and the built-in
//! strategies honor. [`LoaderConfig`] wraps them together with references,
//! keys to treat as already loaded, and the event channel size, and is what
//! [`ConfigManager`] produces from a file and the environment.
//!
//! ```toml
//! preloaded = ["jquery"]
//!
//! [options]
//! link_styles = true
//!
//! [references.ui]
//! requirements = ["jquery"]
//! resources.script = ["/js/ui.js"]
//! resources.style = ["/css/ui.css"]
//! ```

pub mod loader;

use crate::constants::{env, DEFAULT_EVENT_CAPACITY};
use crate::error::{LoaderError, Result};
use crate::registry::ResourceDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use loader::ConfigManager;

/// Switches honored by the engine and the built-in strategies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Install fetched stylesheets as links instead of inline content
    pub link_styles: bool,
    /// Permit transport-level caching of script fetches
    pub cache_scripts: bool,
    /// Permit cross-origin fetches
    pub allow_cross_domain: bool,
    /// Trace every fetch attempt at info level
    pub debug: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            link_styles: false,
            cache_scripts: true,
            allow_cross_domain: false,
            debug: false,
        }
    }
}

impl LoaderOptions {
    /// Defaults overridden by `DLOAD_DEBUG`, `DLOAD_LINK_STYLES`,
    /// `DLOAD_CACHE_SCRIPTS` and `DLOAD_ALLOW_CROSS_DOMAIN`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`LoaderOptions::from_env`] with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        options.merge(OptionsUpdate::from_lookup(lookup)?);
        Ok(options)
    }

    /// Apply only the fields present in `update`
    pub fn merge(&mut self, update: OptionsUpdate) {
        if let Some(link_styles) = update.link_styles {
            self.link_styles = link_styles;
        }
        if let Some(cache_scripts) = update.cache_scripts {
            self.cache_scripts = cache_scripts;
        }
        if let Some(allow_cross_domain) = update.allow_cross_domain {
            self.allow_cross_domain = allow_cross_domain;
        }
        if let Some(debug) = update.debug {
            self.debug = debug;
        }
    }
}

/// Partial options; `None` leaves the current value alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsUpdate {
    pub link_styles: Option<bool>,
    pub cache_scripts: Option<bool>,
    pub allow_cross_domain: Option<bool>,
    pub debug: Option<bool>,
}

impl OptionsUpdate {
    /// Fields set by the flat `DLOAD_*` flag variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| -> Result<Option<bool>> {
            lookup(name).map(|value| parse_flag(name, &value)).transpose()
        };

        Ok(Self {
            link_styles: read(env::LINK_STYLES)?,
            cache_scripts: read(env::CACHE_SCRIPTS)?,
            allow_cross_domain: read(env::ALLOW_CROSS_DOMAIN)?,
            debug: read(env::DEBUG)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.link_styles.is_none()
            && self.cache_scripts.is_none()
            && self.allow_cross_domain.is_none()
            && self.debug.is_none()
    }
}

fn parse_flag(variable: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(LoaderError::InvalidEnvironment {
            variable: variable.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Complete loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub options: LoaderOptions,

    /// Seed the registry with the bundled sample references before applying
    /// `references`
    pub include_default_references: bool,

    pub references: BTreeMap<String, ResourceDescriptor>,

    /// Keys declared as already loaded
    pub preloaded: Vec<String>,

    /// Capacity of the load event broadcast channel
    pub event_capacity: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            options: LoaderOptions::default(),
            include_default_references: false,
            references: BTreeMap::new(),
            preloaded: Vec::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(LoaderError::ConfigurationError(
                "event_capacity must be greater than zero".to_string(),
            ));
        }

        if let Some(name) = self.references.keys().find(|name| name.trim().is_empty()) {
            return Err(LoaderError::ConfigurationError(format!(
                "reference names cannot be blank (got '{name}')"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_option_defaults() {
        let options = LoaderOptions::default();
        assert!(!options.link_styles);
        assert!(options.cache_scripts);
        assert!(!options.allow_cross_domain);
        assert!(!options.debug);
    }

    #[test]
    fn test_merge_only_touches_supplied_fields() {
        let mut options = LoaderOptions::default();
        options.merge(OptionsUpdate {
            debug: Some(true),
            ..OptionsUpdate::default()
        });
        assert!(options.debug);
        assert!(options.cache_scripts);
    }

    #[test]
    fn test_options_from_lookup() {
        let vars = HashMap::from([
            (env::LINK_STYLES, "yes"),
            (env::CACHE_SCRIPTS, "0"),
        ]);
        let options =
            LoaderOptions::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
                .unwrap();

        assert!(options.link_styles);
        assert!(!options.cache_scripts);
        assert!(!options.debug);
    }

    #[test]
    fn test_options_from_lookup_rejects_garbage() {
        let result = LoaderOptions::from_lookup(|name| {
            (name == env::DEBUG).then(|| "sometimes".to_string())
        });
        assert!(matches!(
            result,
            Err(LoaderError::InvalidEnvironment { variable, .. }) if variable == env::DEBUG
        ));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = LoaderConfig {
            event_capacity: 0,
            ..LoaderConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(LoaderConfig::default().validate().is_ok());
    }
}
