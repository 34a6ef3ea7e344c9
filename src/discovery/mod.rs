//! Discovery Module
//!
//! Answers "which replicas of this service exist right now?".
//!
//! Membership is eventually consistent and unordered. Callers must fetch a
//! fresh snapshot for every dispatch and never hold on to it.

mod dns;
mod peer;
mod static_directory;

use async_trait::async_trait;

use crate::error::Result;

pub use dns::DnsPeerDirectory;
pub use peer::{PeerInstance, POD_NAME_LABEL};
pub use static_directory::StaticPeerDirectory;

// == Peer Directory ==
/// Source of cluster membership.
///
/// Implementations return `Ok(vec![])` when the service has no replicas and
/// `Err(CacheError::DirectoryUnavailable)` when the backend could not be
/// asked. The two must never be conflated.
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    async fn list_peers(&self, service: &str) -> Result<Vec<PeerInstance>>;
}
