//! Provider registry — an explicit name → provider map.
//!
//! Built by the caller and passed where it is needed; there is no global
//! provider table.

use std::collections::HashMap;
use std::sync::Arc;

use ferroact_core::provider::LlmProvider;

/// Named LLM collaborators with one designated default.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    default_provider: String,
}

impl ProviderRegistry {
    /// Create an empty registry whose default is `default_provider`.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn LlmProvider>) {
        let name = name.into();
        if self.providers.insert(name.clone(), provider).is_some() {
            tracing::debug!(provider = %name, "Replaced registered provider");
        }
    }

    /// The provider registered under the default name, if any.
    pub fn default_provider(&self) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    pub fn default_name(&self) -> &str {
        &self.default_provider
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedProvider;

    #[test]
    fn register_and_lookup() {
        let mut registry = ProviderRegistry::new("primary");
        registry.register("primary", Arc::new(ScriptedProvider::named("primary")));
        registry.register("backup", Arc::new(ScriptedProvider::named("backup")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list(), ["backup", "primary"]);
        assert_eq!(registry.get("backup").unwrap().name(), "backup");
        assert_eq!(registry.default_provider().unwrap().name(), "primary");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn default_missing_until_registered() {
        let mut registry = ProviderRegistry::new("main");
        assert!(registry.is_empty());
        assert!(registry.default_provider().is_none());

        registry.register("main", Arc::new(ScriptedProvider::named("main")));
        assert_eq!(registry.default_name(), "main");
        assert!(registry.default_provider().is_some());
    }

    #[test]
    fn register_replaces_existing_name() {
        let mut registry = ProviderRegistry::new("p");
        registry.register("p", Arc::new(ScriptedProvider::named("first")));
        registry.register("p", Arc::new(ScriptedProvider::named("second")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("p").unwrap().name(), "second");
    }
}
