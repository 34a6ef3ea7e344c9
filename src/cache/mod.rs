//! Cache Module
//!
//! Replica-local caches with TTL expiration and recency-based eviction.
//! These are the targets of every invalidation, local or remote.

mod entry;
mod manager;
mod recency;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use manager::{CacheManager, CacheSettings};
pub use recency::{EvictionPolicy, RecencyTracker};
pub use stats::CacheStats;
pub use store::CacheStore;
