//! Background work owned by a running replica.
//!
//! Only the TTL sweeper lives here; invalidation broadcasts are spawned by
//! the dispatcher itself.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
