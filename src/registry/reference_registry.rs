//! # Reference Registry
//!
//! Maps symbolic names ("jquery", "ui") to [`ResourceDescriptor`]s.
//!
//! ## Overview
//!
//! A descriptor lists the URLs to fetch per resource type, the names of other
//! references it requires, and optionally a predicate that reports whether the
//! resource is already present in the host. Nothing is validated at
//! registration time; malformed descriptors only surface when resolved.
//!
//! ## Usage
//!
//! ```rust
//! use dload_core::registry::{ReferenceRegistry, ResourceDescriptor};
//!
//! let registry = ReferenceRegistry::new();
//! registry.update([
//!     ("jquery", ResourceDescriptor::new().script("/js/jquery.js")),
//!     (
//!         "ui",
//!         ResourceDescriptor::new()
//!             .style("/css/ui.css")
//!             .script("/js/ui.js")
//!             .requires("jquery"),
//!     ),
//! ]);
//!
//! assert!(registry.contains("ui"));
//! assert_eq!(registry.get_descriptor("ui").unwrap().requirements, vec!["jquery"]);
//! ```

use crate::constants::resource_types;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tag naming a kind of resource ("script", "style", or anything a strategy
/// is registered for)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(String);

impl ResourceType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn script() -> Self {
        Self::new(resource_types::SCRIPT)
    }

    pub fn style() -> Self {
        Self::new(resource_types::STYLE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary type is fetched last, after requirements and every other
    /// resource list of the same descriptor
    pub fn is_primary(&self) -> bool {
        self.0 == resource_types::SCRIPT
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for ResourceType {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// Synchronous "already satisfied?" check
pub type AlreadyLoaded = Arc<dyn Fn() -> bool + Send + Sync>;

/// Everything the loader needs to know about one reference
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Other reference names resolved before this descriptor's own scripts
    #[serde(default)]
    pub requirements: Vec<String>,

    /// Ordered URLs per resource type
    #[serde(default)]
    pub resources: BTreeMap<ResourceType, Vec<String>>,

    #[serde(skip)]
    already_loaded: Option<AlreadyLoaded>,
}

impl ResourceDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, url: impl Into<String>) -> Self {
        self.resource(ResourceType::script(), url)
    }

    pub fn style(self, url: impl Into<String>) -> Self {
        self.resource(ResourceType::style(), url)
    }

    /// Append a URL to the list for `resource_type`
    pub fn resource(
        mut self,
        resource_type: impl Into<ResourceType>,
        url: impl Into<String>,
    ) -> Self {
        self.resources
            .entry(resource_type.into())
            .or_default()
            .push(url.into());
        self
    }

    pub fn requires(mut self, name: impl Into<String>) -> Self {
        self.requirements.push(name.into());
        self
    }

    /// Attach the already-satisfied predicate
    pub fn already_loaded<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.already_loaded = Some(Arc::new(predicate));
        self
    }

    pub fn has_already_loaded_check(&self) -> bool {
        self.already_loaded.is_some()
    }

    /// Run the already-satisfied predicate. A missing predicate and a
    /// panicking one both count as "not loaded".
    pub fn is_already_loaded(&self) -> bool {
        let Some(predicate) = &self.already_loaded else {
            return false;
        };

        match std::panic::catch_unwind(AssertUnwindSafe(|| predicate())) {
            Ok(loaded) => loaded,
            Err(_) => {
                warn!("⚠️ Already-loaded check panicked; treating resource as not loaded");
                false
            }
        }
    }

    /// URLs registered for a type, empty if none
    pub fn urls(&self, resource_type: &ResourceType) -> &[String] {
        self.resources
            .get(resource_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// URLs of the primary ("script") type
    pub fn primary_urls(&self) -> &[String] {
        self.resources
            .iter()
            .find(|(resource_type, _)| resource_type.is_primary())
            .map(|(_, urls)| urls.as_slice())
            .unwrap_or_default()
    }

    /// Every non-primary resource list, in type order
    pub fn secondary_resources(&self) -> impl Iterator<Item = (&ResourceType, &[String])> {
        self.resources
            .iter()
            .filter(|(resource_type, _)| !resource_type.is_primary())
            .map(|(resource_type, urls)| (resource_type, urls.as_slice()))
    }

    /// Resource types this descriptor references
    pub fn resource_types(&self) -> impl Iterator<Item = &ResourceType> {
        self.resources.keys()
    }
}

impl std::fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("requirements", &self.requirements)
            .field("resources", &self.resources)
            .field(
                "already_loaded",
                &self.already_loaded.as_ref().map(|_| "Fn() -> bool"),
            )
            .finish()
    }
}

/// Registry of named references
#[derive(Debug, Default)]
pub struct ReferenceRegistry {
    references: RwLock<HashMap<String, ResourceDescriptor>>,
}

impl ReferenceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the sample references the loader ships with
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.update(default_references());
        registry
    }

    /// Full current mapping
    pub fn get(&self) -> HashMap<String, ResourceDescriptor> {
        self.references.read().clone()
    }

    pub fn get_descriptor(&self, name: &str) -> Option<ResourceDescriptor> {
        self.references.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.references.read().contains_key(name)
    }

    /// Shallow merge: incoming names overwrite, everything else is untouched
    pub fn update<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, ResourceDescriptor)>,
        K: Into<String>,
    {
        let mut references = self.references.write();
        let mut count = 0usize;

        for (name, descriptor) in entries {
            let name = name.into();
            if references.contains_key(&name) {
                debug!(reference = %name, "🔁 Replacing existing reference");
            }
            references.insert(name, descriptor);
            count += 1;
        }

        info!(
            updated = count,
            total = references.len(),
            "📚 Reference registry updated"
        );
    }

    /// Drop every reference and install `entries` instead
    pub fn replace<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, ResourceDescriptor)>,
        K: Into<String>,
    {
        self.references.write().clear();
        self.update(entries);
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.references.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.references.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.read().is_empty()
    }
}

fn default_references() -> Vec<(&'static str, ResourceDescriptor)> {
    vec![
        (
            "jquery",
            ResourceDescriptor::new()
                .script("//ajax.googleapis.com/ajax/libs/jquery/1.9.1/jquery.min.js"),
        ),
        (
            "ui",
            ResourceDescriptor::new()
                .script("//ajax.googleapis.com/ajax/libs/jqueryui/1.10.2/jquery-ui.min.js")
                .requires("jquery"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_is_shallow_merge() {
        let registry = ReferenceRegistry::new();
        registry.update([
            ("a", ResourceDescriptor::new().script("/a.js")),
            ("b", ResourceDescriptor::new().script("/b.js")),
        ]);
        registry.update([("a", ResourceDescriptor::new().script("/a2.js"))]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_descriptor("a").unwrap().primary_urls(), ["/a2.js"]);
        assert_eq!(registry.get_descriptor("b").unwrap().primary_urls(), ["/b.js"]);
    }

    #[test]
    fn test_replace_drops_previous_entries() {
        let registry = ReferenceRegistry::with_defaults();
        registry.replace([("only", ResourceDescriptor::new())]);
        assert_eq!(registry.names(), vec!["only".to_string()]);
    }

    #[test]
    fn test_defaults_contain_sample_references() {
        let registry = ReferenceRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["jquery".to_string(), "ui".to_string()]);
        assert_eq!(registry.get_descriptor("ui").unwrap().requirements, ["jquery"]);
    }

    #[test]
    fn test_secondary_resources_exclude_scripts() {
        let descriptor = ResourceDescriptor::new()
            .script("/x.js")
            .style("/x.css")
            .resource("json", "/x.json");

        let secondary: Vec<&str> = descriptor
            .secondary_resources()
            .map(|(resource_type, _)| resource_type.as_str())
            .collect();
        assert_eq!(secondary, vec!["json", "style"]);
        assert_eq!(descriptor.primary_urls(), ["/x.js"]);
        assert!(descriptor.urls(&ResourceType::new("font")).is_empty());
    }

    #[test]
    fn test_already_loaded_predicate() {
        let plain = ResourceDescriptor::new();
        assert!(!plain.has_already_loaded_check());
        assert!(!plain.is_already_loaded());

        let loaded = ResourceDescriptor::new().already_loaded(|| true);
        assert!(loaded.is_already_loaded());

        let panicking = ResourceDescriptor::new().already_loaded(|| panic!("predicate failed"));
        assert!(!panicking.is_already_loaded());
    }

    #[test]
    fn test_descriptor_deserializes_without_predicate() {
        let descriptor: ResourceDescriptor = serde_json::from_value(serde_json::json!({
            "requirements": ["jquery"],
            "resources": { "style": ["/ui.css"], "script": ["/ui.js"] }
        }))
        .unwrap();

        assert_eq!(descriptor.requirements, ["jquery"]);
        assert_eq!(descriptor.urls(&ResourceType::style()), ["/ui.css"]);
        assert!(!descriptor.has_already_loaded_check());
    }
}
