//! Backend registry.
//!
//! # Responsibilities
//! - Own the set of known backends for the process lifetime
//! - Look backends up by key
//! - Preserve registration order for listing and auto-fallback

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::BackendConfig;
use crate::error::{RouterError, RouterResult};
use crate::registry::backend::{backend_key, Backend};

/// Registry of backends, append-only.
#[derive(Debug, Default)]
pub struct Registry {
    /// key -> backend, for lock-free lookups on the request path.
    index: DashMap<String, Arc<Backend>>,
    /// Registration order.
    order: RwLock<Vec<Arc<Backend>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded from configuration, in listing order.
    pub fn from_config(configs: &[BackendConfig]) -> RouterResult<Self> {
        let registry = Self::new();
        for config in configs {
            registry.register(&config.provider, &config.model)?;
        }
        Ok(registry)
    }

    /// Register a new backend. Fails if the `provider:model` key already exists.
    pub fn register(&self, provider: &str, model: &str) -> RouterResult<Arc<Backend>> {
        let key = backend_key(provider, model);

        // Hold the order lock across the index insert so listing order
        // matches insertion order under concurrent registration.
        let mut order = self.order.write().unwrap_or_else(PoisonError::into_inner);
        match self.index.entry(key) {
            Entry::Occupied(entry) => Err(RouterError::DuplicateKey(entry.key().clone())),
            Entry::Vacant(slot) => {
                let backend = Arc::new(Backend::new(provider, model));
                slot.insert(Arc::clone(&backend));
                order.push(Arc::clone(&backend));
                tracing::info!(key = %backend.key(), "Backend registered");
                Ok(backend)
            }
        }
    }

    /// Look up a backend by key.
    pub fn get(&self, key: &str) -> RouterResult<Arc<Backend>> {
        self.index
            .get(key)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| RouterError::NotFound(key.to_string()))
    }

    /// All keys in registration order.
    pub fn list_keys(&self) -> Vec<String> {
        self.order
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|b| b.key().to_string())
            .collect()
    }

    /// All backends in registration order.
    pub fn all_backends(&self) -> Vec<Arc<Backend>> {
        self.order
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
