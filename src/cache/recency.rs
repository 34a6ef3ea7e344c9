//! Recency Tracker Module
//!
//! Orders keys by their last touch so the store can pick an eviction victim.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

// == Eviction Policy ==
/// Which operations count as "using" an entry for eviction purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Reads and writes both refresh recency
    #[default]
    LeastRecentlyUsed,
    /// Only writes refresh recency
    LeastRecentlyWritten,
}

impl EvictionPolicy {
    /// Returns true if a successful read should refresh the key.
    pub fn touches_on_read(self) -> bool {
        matches!(self, EvictionPolicy::LeastRecentlyUsed)
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" | "least-recently-used" => Ok(EvictionPolicy::LeastRecentlyUsed),
            "lrw" | "least-recently-written" => Ok(EvictionPolicy::LeastRecentlyWritten),
            other => Err(format!("unknown eviction policy: {other}")),
        }
    }
}

// == Recency Tracker ==
/// Tracks a logical clock per key.
///
/// Every touch stamps the key with a strictly increasing tick, so the oldest
/// key is always the first entry of `by_tick`. Ties are impossible, which keeps
/// victim selection deterministic.
#[derive(Debug, Default)]
pub struct RecencyTracker {
    next_tick: u64,
    by_tick: BTreeMap<u64, String>,
    ticks: HashMap<String, u64>,
}

impl RecencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as the most recent one.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        if let Some(previous) = self.ticks.insert(key.to_string(), tick) {
            self.by_tick.remove(&previous);
        }
        self.by_tick.insert(tick, key.to_string());
    }

    // == Remove ==
    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently touched key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    /// Returns the least recently touched key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.by_tick.first_key_value().map(|(_, key)| key.as_str())
    }

    pub fn clear(&mut self) {
        self.by_tick.clear();
        self.ticks.clear();
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
