//! Plugin-based provider registry
//!
//! The registry maps provider type names ("hetzner-dns", "hetzner-cloud") to
//! factories, so the daemon can pick a provider model from configuration
//! without hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::registry::ProviderRegistry;
//! use ddns_core::config::ProviderConfig;
//!
//! let registry = ProviderRegistry::new();
//! ddns_provider_hetzner::register(&registry);
//!
//! let config = ProviderConfig::from_type_name("hetzner-dns", token, None)?;
//! let provider = registry.create_provider(&config)?;
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{ProviderModel, ProviderModelFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Provider registry for plugin-based provider model creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered provider model factories
    providers: RwLock<HashMap<String, Box<dyn ProviderModelFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider model factory
    ///
    /// Registering a name twice replaces the earlier factory.
    pub fn register_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn ProviderModelFactory>,
    ) {
        let name = name.into();
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(name, factory);
    }

    /// Create a provider model from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ProviderModel>)`: Created provider instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn ProviderModel>> {
        let provider_type = config.type_name();
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// List all registered provider types, sorted
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }
}
