use crate::cache::{LoadTimeRecorder, PromiseCache};
use crate::config::{LoaderConfig, LoaderOptions, OptionsUpdate};
use crate::error::Result;
use crate::events::LoadEventPublisher;
use crate::registry::{ReferenceRegistry, StrategyTable};
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

/// Shared loader state
///
/// This serves as the dependency injection container for the engine,
/// replacing process-wide globals:
/// - Reference registry
/// - Promise cache
/// - Strategy table
/// - Load-time recorder
/// - Load event publisher
/// - Current options
pub struct LoaderContext {
    /// Loader instance ID
    pub context_id: Uuid,

    pub references: ReferenceRegistry,

    pub promises: PromiseCache,

    pub strategies: StrategyTable,

    pub load_times: LoadTimeRecorder,

    pub event_publisher: LoadEventPublisher,

    options: RwLock<LoaderOptions>,
}

impl std::fmt::Debug for LoaderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderContext")
            .field("context_id", &self.context_id)
            .field("references", &self.references.len())
            .field("promises", &self.promises.len())
            .field("strategy_types", &self.strategies.registered_types())
            .field("load_times", &self.load_times.len())
            .field("subscribers", &self.event_publisher.subscriber_count())
            .field("options", &*self.options.read())
            .finish()
    }
}

impl Default for LoaderContext {
    fn default() -> Self {
        Self::with_options(LoaderOptions::default(), crate::constants::DEFAULT_EVENT_CAPACITY)
    }
}

impl LoaderContext {
    /// Empty context: no references, no strategies, nothing cached
    pub fn with_options(options: LoaderOptions, event_capacity: usize) -> Self {
        Self {
            context_id: Uuid::new_v4(),
            references: ReferenceRegistry::new(),
            promises: PromiseCache::new(),
            strategies: StrategyTable::new(),
            load_times: LoadTimeRecorder::new(),
            event_publisher: LoadEventPublisher::new(event_capacity),
            options: RwLock::new(options),
        }
    }

    /// Build a context from configuration: options, references and
    /// preloaded keys. Strategies are registered separately.
    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        config.validate()?;

        let context = Self::with_options(config.options.clone(), config.event_capacity);

        if config.include_default_references {
            context.references.update(ReferenceRegistry::with_defaults().get());
        }
        if !config.references.is_empty() {
            context.references.update(config.references.clone());
        }
        for key in &config.preloaded {
            context.promises.mark_loaded(key.clone());
        }

        info!(
            context_id = %context.context_id,
            references = context.references.len(),
            preloaded = config.preloaded.len(),
            "🏗️ Loader context initialized from configuration"
        );

        Ok(context)
    }

    /// Current options (copied, so a fetch keeps the options it started with)
    pub fn options(&self) -> LoaderOptions {
        self.options.read().clone()
    }

    /// Merge `update` into the options and return the result
    pub fn update_options(&self, update: OptionsUpdate) -> LoaderOptions {
        let mut options = self.options.write();
        options.merge(update);
        info!(options = ?*options, "⚙️ Loader options updated");
        options.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ResourceDescriptor;
    use crate::task::TaskState;

    #[test]
    fn test_from_config_seeds_registry_and_cache() {
        let mut config = LoaderConfig {
            include_default_references: true,
            preloaded: vec!["jquery".to_string()],
            ..LoaderConfig::default()
        };
        config
            .references
            .insert("charts".to_string(), ResourceDescriptor::new().script("/charts.js"));

        let context = LoaderContext::from_config(&config).unwrap();
        assert_eq!(context.references.names(), vec!["charts", "jquery", "ui"]);
        assert_eq!(
            context.promises.get("jquery").unwrap().state(),
            TaskState::Resolved(None)
        );
    }

    #[test]
    fn test_update_options_merges() {
        let context = LoaderContext::default();
        let updated = context.update_options(OptionsUpdate {
            link_styles: Some(true),
            ..OptionsUpdate::default()
        });
        assert!(updated.link_styles);
        assert_eq!(context.options(), updated);
    }
}
