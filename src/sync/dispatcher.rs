//! Invalidation Dispatcher
//!
//! Fans one eviction out to every replica the peer directory knows about.
//!
//! Each peer gets its own `DELETE` with its own deadline, all in flight at
//! once. A failing peer only ever affects its own entry in the summary.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, Url};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::discovery::{PeerDirectory, PeerInstance};
use crate::error::{CacheError, Result};
use crate::sync::{DispatchOutcome, DispatchSummary};

/// Default per-peer call budget.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

// == Invalidation Request ==
/// What a peer should drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationRequest {
    /// One key of one cache
    Entry { cache_name: String, key: String },
    /// Every key of one cache
    Cache { cache_name: String },
    /// Every configured cache
    AllCaches,
}

impl InvalidationRequest {
    pub fn entry(cache_name: impl Into<String>, key: impl Into<String>) -> Self {
        InvalidationRequest::Entry {
            cache_name: cache_name.into(),
            key: key.into(),
        }
    }

    pub fn cache(cache_name: impl Into<String>) -> Self {
        InvalidationRequest::Cache {
            cache_name: cache_name.into(),
        }
    }

    // == Peer URL ==
    /// Builds `DELETE /caches[/{cache}][?key={key}]` against `peer`, with the
    /// cache name and key percent-encoded.
    pub fn url_for(&self, peer: &PeerInstance) -> std::result::Result<Url, String> {
        let mut url = Url::parse(&peer.base_url()).map_err(|e| format!("invalid peer url: {e}"))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| "peer url cannot carry a path".to_string())?;
            segments.pop_if_empty().push("caches");
            match self {
                InvalidationRequest::Entry { cache_name, .. }
                | InvalidationRequest::Cache { cache_name } => {
                    segments.push(cache_name);
                }
                InvalidationRequest::AllCaches => {}
            }
        }
        if let InvalidationRequest::Entry { key, .. } = self {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

impl fmt::Display for InvalidationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationRequest::Entry { cache_name, key } => write!(f, "{cache_name}[{key}]"),
            InvalidationRequest::Cache { cache_name } => write!(f, "{cache_name}[*]"),
            InvalidationRequest::AllCaches => f.write_str("all caches"),
        }
    }
}

// == Invalidation Dispatcher ==
pub struct InvalidationDispatcher {
    directory: Arc<dyn PeerDirectory>,
    client: Client,
    service: String,
    timeout: Duration,
}

impl InvalidationDispatcher {
    // == Constructor ==
    /// # Arguments
    /// * `directory` - Membership source, queried once per broadcast
    /// * `service` - Service identity whose replicas are targeted
    /// * `timeout` - Hard deadline for each per-peer call
    pub fn new(
        directory: Arc<dyn PeerDirectory>,
        service: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            directory,
            client,
            service: service.into(),
            timeout,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current membership snapshot for the configured service.
    pub async fn peers(&self) -> Result<Vec<PeerInstance>> {
        self.directory.list_peers(&self.service).await
    }

    // == Broadcast Evict ==
    /// Asks every peer to drop `key` from `cache_name`.
    pub async fn broadcast_evict(&self, cache_name: &str, key: &str) -> Result<DispatchSummary> {
        self.broadcast(&InvalidationRequest::entry(cache_name, key))
            .await
    }

    // == Broadcast Evict All ==
    /// Asks every peer to clear `cache_name`.
    pub async fn broadcast_evict_all(&self, cache_name: &str) -> Result<DispatchSummary> {
        self.broadcast(&InvalidationRequest::cache(cache_name)).await
    }

    /// Asks every peer to clear all of its caches.
    pub async fn broadcast_evict_every_cache(&self) -> Result<DispatchSummary> {
        self.broadcast(&InvalidationRequest::AllCaches).await
    }

    // == Broadcast ==
    /// Resolves peers, then sends `request` to each concurrently.
    ///
    /// Returns `Err` only when the directory cannot be asked. Otherwise the
    /// summary holds exactly one outcome per peer, whatever happened to it.
    /// Self-addressed peers are treated like any other.
    pub async fn broadcast(&self, request: &InvalidationRequest) -> Result<DispatchSummary> {
        let peers = self.peers().await?;
        info!(
            "Found {} instances of service '{}' for eviction of {}",
            peers.len(),
            self.service,
            request
        );

        let keys = summary_keys(&peers);
        let calls = peers.iter().zip(keys).map(|(peer, key)| async move {
            let outcome = self.dispatch_one(peer, request).await;
            log_outcome(peer, request, &outcome);
            (key, outcome)
        });

        Ok(join_all(calls).await.into_iter().collect())
    }

    /// Runs `broadcast` on the runtime without waiting for it.
    ///
    /// The write path uses this so its response never depends on peers.
    pub fn spawn_broadcast(self: &Arc<Self>, request: InvalidationRequest) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            match dispatcher.broadcast(&request).await {
                Ok(summary) => info!(
                    "Broadcast of {} finished: {} evicted, {} failed",
                    request,
                    summary.evicted(),
                    summary.failed()
                ),
                Err(e) => warn!("Broadcast of {} skipped: {}", request, e),
            }
        })
    }

    // == Dispatch One ==
    async fn dispatch_one(&self, peer: &PeerInstance, request: &InvalidationRequest) -> DispatchOutcome {
        let url = match request.url_for(peer) {
            Ok(url) => url,
            Err(reason) => return DispatchOutcome::Unreachable { reason },
        };

        match tokio::time::timeout(self.timeout, self.client.delete(url).send()).await {
            Err(_) => DispatchOutcome::TimedOut,
            Ok(Err(e)) if e.is_timeout() => DispatchOutcome::TimedOut,
            Ok(Err(e)) => DispatchOutcome::Unreachable {
                reason: e.to_string(),
            },
            Ok(Ok(response)) if response.status().is_success() => DispatchOutcome::Evicted,
            Ok(Ok(response)) => DispatchOutcome::Rejected {
                status: response.status().as_u16(),
            },
        }
    }
}

/// One distinct summary key per peer, in peer order.
///
/// Unique ids are used as is. Peers sharing an id are keyed `id@host:port`,
/// with a `#n` suffix if even that repeats.
fn summary_keys(peers: &[PeerInstance]) -> Vec<String> {
    let mut id_counts: HashMap<&str, usize> = HashMap::new();
    for peer in peers {
        *id_counts.entry(peer.id.as_str()).or_default() += 1;
    }

    let mut used = HashSet::new();
    peers
        .iter()
        .map(|peer| {
            let base = if id_counts[peer.id.as_str()] > 1 {
                warn!(
                    "Peer id '{}' is shared by several instances, reporting {}:{} separately",
                    peer.id, peer.host, peer.port
                );
                format!("{}@{}:{}", peer.id, peer.host, peer.port)
            } else {
                peer.id.clone()
            };

            let mut key = base.clone();
            let mut n = 2;
            while !used.insert(key.clone()) {
                key = format!("{base}#{n}");
                n += 1;
            }
            key
        })
        .collect()
}

fn log_outcome(peer: &PeerInstance, request: &InvalidationRequest, outcome: &DispatchOutcome) {
    let name = peer.display_name();
    let uri = peer.base_url();
    match outcome {
        DispatchOutcome::Evicted => info!(
            "Evicted {} on pod: {} (uri={}, labels={:?})",
            request, name, uri, peer.labels
        ),
        DispatchOutcome::Rejected { status } => warn!(
            "Pod {} rejected eviction of {} with status {} (uri={})",
            name, request, status, uri
        ),
        DispatchOutcome::TimedOut => error!(
            "Eviction of {} on pod {} timed out (uri={})",
            request, name, uri
        ),
        DispatchOutcome::Unreachable { reason } => error!(
            "Failed to evict {} on pod: {} - {} (uri={})",
            request, name, reason, uri
        ),
    }
}
