//! DNS Peer Directory
//!
//! Resolves a headless service name (one A/AAAA record per ready replica, as
//! Kubernetes publishes them) into peers.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::lookup_host;
use tracing::{debug, warn};

use super::{PeerDirectory, PeerInstance};
use crate::error::{CacheError, Result};

/// Label recording which DNS name produced the peer.
pub const DNS_NAME_LABEL: &str = "dns.name";

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct DnsPeerDirectory {
    /// Name to resolve; the requested service name when unset
    host: Option<String>,
    port: u16,
    lookup_timeout: Duration,
}

impl DnsPeerDirectory {
    /// Resolves the service name itself, targeting `port` on every address.
    pub fn new(port: u16) -> Self {
        Self {
            host: None,
            port,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Resolves `host` instead of the service name.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }
}

#[async_trait]
impl PeerDirectory for DnsPeerDirectory {
    async fn list_peers(&self, service: &str) -> Result<Vec<PeerInstance>> {
        let host = self.host.as_deref().unwrap_or(service);

        let resolved = tokio::time::timeout(self.lookup_timeout, lookup_host((host, self.port)))
            .await
            .map_err(|_| {
                warn!("DNS lookup for '{}' timed out", host);
                CacheError::DirectoryUnavailable(format!("lookup of '{host}' timed out"))
            })?
            .map_err(|e| {
                warn!("DNS lookup for '{}' failed: {}", host, e);
                CacheError::DirectoryUnavailable(format!("lookup of '{host}' failed: {e}"))
            })?;

        // Resolvers may repeat an address once per record type or search domain
        let addresses: BTreeSet<SocketAddr> = resolved.collect();
        debug!("DNS lookup for '{}' returned {} addresses", host, addresses.len());

        Ok(addresses
            .into_iter()
            .map(|addr| {
                PeerInstance::new(addr.to_string(), addr.ip().to_string(), addr.port())
                    .with_label(DNS_NAME_LABEL, host)
            })
            .collect())
    }
}
