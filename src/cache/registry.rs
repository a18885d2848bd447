//! Cache registry - Central management for all caches.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::{CacheConfig, TypedCache};

/// Central registry for managing multiple typed caches.
///
/// Repositories create and share their caches by name, so two
/// repositories asking for the same name get the same cache.
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

/// Internal cache entry storing type-erased cache.
struct CacheEntry {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheEntry {
    fn downcast<K, V>(&self) -> Option<TypedCache<K, V>>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if self.type_id != TypeId::of::<TypedCache<K, V>>() {
            return None;
        }
        self.cache.downcast_ref::<TypedCache<K, V>>().cloned()
    }
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get an existing cache or create a new one if it doesn't exist.
    ///
    /// If the name is already registered with different key/value types, a
    /// fresh unregistered cache is returned and a warning is logged.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.write();

        if let Some(existing) = caches.get(name) {
            if let Some(cache) = existing.downcast::<K, V>() {
                return cache;
            }
            warn!(
                "Cache '{}' already exists with different types: expected {}, got {}",
                name,
                std::any::type_name::<TypedCache<K, V>>(),
                existing.type_name
            );
            return TypedCache::new(name, config);
        }

        debug!("Creating cache: {}", name);
        let cache = TypedCache::new(name, config);
        caches.insert(
            name.to_string(),
            CacheEntry {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<TypedCache<K, V>>(),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );

        cache
    }

    /// Get a list of all registered cache names.
    pub fn cache_names(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_shares_cache() {
        let registry = CacheRegistry::new();
        let a: TypedCache<String, u32> = registry.get_or_create("groups", CacheConfig::directory());
        let b: TypedCache<String, u32> = registry.get_or_create("groups", CacheConfig::directory());

        a.insert("fi_".to_string(), 1);
        assert_eq!(b.get(&"fi_".to_string()), Some(1));
        assert_eq!(registry.cache_names(), vec!["groups".to_string()]);
    }

    #[test]
    fn test_type_mismatch_returns_private_cache() {
        let registry = CacheRegistry::new();
        let a: TypedCache<String, u32> = registry.get_or_create("groups", CacheConfig::default());
        let b: TypedCache<u64, String> = registry.get_or_create("groups", CacheConfig::default());

        a.insert("x".to_string(), 1);
        b.insert(1, "y".to_string());
        assert_eq!(a.get(&"x".to_string()), Some(1));
        assert_eq!(registry.cache_names().len(), 1);
    }
}
