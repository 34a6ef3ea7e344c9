//! Cache Store Module
//!
//! A single named cache: bounded map with TTL expiry and recency-based
//! capacity eviction. Not synchronized; [`CacheManager`](super::CacheManager)
//! wraps each store in a lock.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EvictionPolicy, RecencyTracker};

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    recency: RecencyTracker,
    stats: CacheStats,
    max_entries: usize,
    ttl: Duration,
    policy: EvictionPolicy,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity; a value of 0 is treated as 1
    /// * `ttl` - Lifetime of every written entry
    /// * `policy` - How the capacity victim is chosen
    pub fn new(max_entries: usize, ttl: Duration, policy: EvictionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            ttl,
            policy,
        }
    }

    // == Put ==
    /// Inserts or replaces the value for `key` and resets its write time.
    ///
    /// When a new key arrives at capacity, the oldest key by the configured
    /// policy is dropped first.
    pub fn put(&mut self, key: String, value: V) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(victim) = self.recency.pop_oldest() {
                self.entries.remove(&victim);
                self.stats.record_capacity_eviction();
                debug!("Capacity eviction of key '{}'", victim);
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value, self.ttl));
        self.recency.touch(&key);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the live value for `key`, or `None` on a miss.
    ///
    /// Expired entries are dropped here. Reads never extend the TTL.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.recency.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        if self.policy.touches_on_read() {
            self.recency.touch(key);
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Evict ==
    /// Removes `key` if present. Returns whether an entry was removed.
    pub fn evict(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.recency.remove(key);
            self.stats.record_invalidations(1);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Clear ==
    /// Removes every entry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.recency.clear();
        self.stats.record_invalidations(count);
        self.stats.set_total_entries(0);
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.recency.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
