//! Name-keyed provider lookup populated at startup.
//!
//! ```rust
//! use ioprovider::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! assert!(registry.is_empty());
//! assert!(registry.get("openai").is_none());
//! ```

use std::sync::Arc;

use iocommon::Registry;

use crate::ModelProvider;

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Registry<String, Arc<dyn ModelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers under the provider's own name, replacing any previous entry.
    pub fn register<P>(&mut self, provider: P)
    where
        P: ModelProvider + 'static,
    {
        self.register_shared(Arc::new(provider));
    }

    pub fn register_shared(&mut self, provider: Arc<dyn ModelProvider>) {
        let name = provider.name().to_string();
        self.providers.insert(name, provider);
    }

    /// Registers under an explicit key, for aliasing one adapter to several names.
    pub fn register_as(&mut self, name: impl Into<String>, provider: Arc<dyn ModelProvider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: ModelProvider + 'static,
    {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ModelProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn ModelProvider>> {
        self.providers.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names = self.providers.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
