//! Sync Module
//!
//! Pushes evictions from the replica that changed the data to every other
//! replica. Consistency is eventual: a peer missed by a broadcast keeps its
//! stale entry until TTL expiry or the next broadcast reaches it.

mod dispatcher;
mod outcome;

pub use dispatcher::{InvalidationDispatcher, InvalidationRequest, DEFAULT_PEER_TIMEOUT};
pub use outcome::{DispatchOutcome, DispatchSummary};
