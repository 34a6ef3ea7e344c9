//! Cache Sync - replica-local caches kept eventually consistent
//!
//! Every replica holds its own TTL/size-bounded caches. The replica that
//! writes the backing data evicts its own entry, then broadcasts the eviction
//! to every peer found through the peer directory.

pub mod api;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod products;
pub mod sync;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{CacheError, Result};
pub use sync::{DispatchOutcome, DispatchSummary, InvalidationDispatcher};
pub use tasks::spawn_cleanup_task;
