//! Cache Manager Module
//!
//! The replica-local cache registry: a fixed set of named [`CacheStore`]s,
//! each behind its own lock.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore, EvictionPolicy};
use crate::error::{CacheError, Result};

// == Cache Settings ==
/// Parameters shared by every named cache.
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub max_entries: usize,
    pub ttl: Duration,
    pub policy: EvictionPolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl: Duration::from_secs(600),
            policy: EvictionPolicy::LeastRecentlyUsed,
        }
    }
}

// == Cache Manager ==
/// Named caches for one replica.
///
/// The name set is decided at construction and never changes, so lookups
/// need no lock; each store is locked independently.
pub struct CacheManager<V> {
    caches: BTreeMap<String, RwLock<CacheStore<V>>>,
}

impl<V: Clone + Send + Sync> CacheManager<V> {
    // == Constructor ==
    /// Creates one empty store per name. Blank and duplicate names are ignored.
    pub fn new<I, S>(names: I, settings: CacheSettings) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let caches = names
            .into_iter()
            .map(|name| {
                let name: String = name.into();
                name.trim().to_string()
            })
            .filter(|name| !name.is_empty())
            .map(|name| {
                let store = CacheStore::new(settings.max_entries, settings.ttl, settings.policy);
                (name, RwLock::new(store))
            })
            .collect();

        Self { caches }
    }

    /// Convenience constructor returning the manager behind an `Arc`.
    pub fn shared<I, S>(names: I, settings: CacheSettings) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self::new(names, settings))
    }

    fn cache(&self, cache_name: &str) -> Result<&RwLock<CacheStore<V>>> {
        self.caches
            .get(cache_name)
            .ok_or_else(|| CacheError::CacheNotFound(cache_name.to_string()))
    }

    // == Names ==
    /// Configured cache names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    pub fn contains(&self, cache_name: &str) -> bool {
        self.caches.contains_key(cache_name)
    }

    // == Get ==
    /// Returns `Ok(None)` on a miss; `Err` only for an unknown cache.
    pub async fn get(&self, cache_name: &str, key: &str) -> Result<Option<V>> {
        // Write lock: a read may drop an expired entry and updates recency
        let mut cache = self.cache(cache_name)?.write().await;
        Ok(cache.get(key))
    }

    // == Put ==
    pub async fn put(&self, cache_name: &str, key: impl Into<String>, value: V) -> Result<()> {
        let mut cache = self.cache(cache_name)?.write().await;
        cache.put(key.into(), value);
        Ok(())
    }

    // == Evict ==
    /// Drops `key` from `cache_name`. Absent keys are not an error.
    pub async fn evict(&self, cache_name: &str, key: &str) -> Result<bool> {
        let removed = self.cache(cache_name)?.write().await.evict(key);
        debug!(cache = cache_name, key, removed, "Local evict");
        Ok(removed)
    }

    // == Evict All ==
    /// Clears one named cache and returns how many entries were dropped.
    pub async fn evict_all(&self, cache_name: &str) -> Result<usize> {
        let removed = self.cache(cache_name)?.write().await.clear();
        info!(cache = cache_name, removed, "Local cache cleared");
        Ok(removed)
    }

    // == Evict Every Cache ==
    /// Clears all named caches and returns the total number of dropped entries.
    pub async fn evict_every_cache(&self) -> usize {
        let mut removed = 0;
        for cache in self.caches.values() {
            removed += cache.write().await.clear();
        }
        info!(caches = self.caches.len(), removed, "All local caches cleared");
        removed
    }

    // == Cleanup Expired ==
    /// Sweeps expired entries from every cache.
    pub async fn cleanup_expired(&self) -> usize {
        let mut removed = 0;
        for cache in self.caches.values() {
            removed += cache.write().await.cleanup_expired();
        }
        removed
    }

    // == Stats ==
    pub async fn stats(&self) -> BTreeMap<String, CacheStats> {
        let mut all = BTreeMap::new();
        for (name, cache) in &self.caches {
            all.insert(name.clone(), cache.read().await.stats());
        }
        all
    }
}
