//! Global provider registry
//!
//! Maps a logical provider name (e.g. `"sqlite"`) to the factory that builds
//! its connections. Sessions resolve their provider here by name.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use dbkit_core::{Error, Result};
use tracing::debug;

use crate::traits::ProviderFactory;

// =============================================================================
// Global Provider Registry
// =============================================================================
//
// Process-wide state with one entry point for writes. Registering a name that
// already exists replaces the previous factory, which is returned to the
// caller.
//
// Uses parking_lot::RwLock so a panic while holding the lock does not poison
// every later lookup.

static PROVIDERS: Lazy<RwLock<HashMap<String, Arc<dyn ProviderFactory>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register `factory` under `name`, returning the factory it replaced.
pub fn register_provider(
    name: impl Into<String>,
    factory: Arc<dyn ProviderFactory>,
) -> Option<Arc<dyn ProviderFactory>> {
    let name = name.into();
    debug!(provider = %name, "registering provider");
    PROVIDERS.write().insert(name, factory)
}

/// Remove the provider registered under `name`.
pub fn unregister_provider(name: &str) -> Option<Arc<dyn ProviderFactory>> {
    PROVIDERS.write().remove(name)
}

/// Resolve a provider by name.
///
/// # Errors
///
/// Returns [`Error::ProviderNotFound`] if nothing is registered under `name`.
pub fn provider(name: &str) -> Result<Arc<dyn ProviderFactory>> {
    PROVIDERS
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| Error::ProviderNotFound {
            provider: name.to_string(),
        })
}

/// Names of all registered providers, sorted.
pub fn registered_providers() -> Vec<String> {
    let mut names: Vec<String> = PROVIDERS.read().keys().cloned().collect();
    names.sort();
    names
}
