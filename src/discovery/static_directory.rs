//! Static Peer Directory
//!
//! Membership from configuration. Used for local fleets and tests.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{PeerDirectory, PeerInstance};
use crate::error::Result;

/// A fixed service → peers table.
#[derive(Debug, Clone, Default)]
pub struct StaticPeerDirectory {
    services: HashMap<String, Vec<PeerInstance>>,
}

impl StaticPeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `peers` as the members of `service`, replacing any previous set.
    pub fn with_service(mut self, service: impl Into<String>, peers: Vec<PeerInstance>) -> Self {
        self.services.insert(service.into(), peers);
        self
    }
}

#[async_trait]
impl PeerDirectory for StaticPeerDirectory {
    async fn list_peers(&self, service: &str) -> Result<Vec<PeerInstance>> {
        Ok(self.services.get(service).cloned().unwrap_or_default())
    }
}
