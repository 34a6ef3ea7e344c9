//! Response DTOs for the cache sync API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::discovery::PeerInstance;
use crate::sync::DispatchSummary;

/// Response body of the invalidation endpoint (`DELETE /caches/...`)
#[derive(Debug, Clone, Serialize)]
pub struct EvictResponse {
    /// Cache that was touched, absent when every cache was cleared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_name: Option<String>,
    /// Key that was evicted, absent for a full clear
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Number of entries actually dropped
    pub removed: usize,
}

impl EvictResponse {
    pub fn key(cache_name: impl Into<String>, key: impl Into<String>, removed: bool) -> Self {
        Self {
            cache_name: Some(cache_name.into()),
            key: Some(key.into()),
            removed: usize::from(removed),
        }
    }

    pub fn cache(cache_name: impl Into<String>, removed: usize) -> Self {
        Self {
            cache_name: Some(cache_name.into()),
            key: None,
            removed,
        }
    }

    pub fn all(removed: usize) -> Self {
        Self {
            cache_name: None,
            key: None,
            removed,
        }
    }
}

/// Response body of the admin sync triggers
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub peer_count: usize,
    pub evicted: usize,
    pub failed: usize,
    /// Outcome per peer id
    pub peers: DispatchSummary,
}

impl SyncResponse {
    pub fn new(message: impl Into<String>, cache_name: Option<String>, peers: DispatchSummary) -> Self {
        Self {
            message: message.into(),
            cache_name,
            timestamp: Utc::now(),
            peer_count: peers.len(),
            evicted: peers.evicted(),
            failed: peers.failed(),
            peers,
        }
    }
}

/// Response body of the local-only clear
#[derive(Debug, Clone, Serialize)]
pub struct LocalClearResponse {
    pub message: String,
    pub cache_name: String,
    pub removed: usize,
}

impl LocalClearResponse {
    pub fn new(cache_name: impl Into<String>, removed: usize) -> Self {
        let cache_name = cache_name.into();
        Self {
            message: format!("Local cache cleared: {}", cache_name),
            cache_name,
            removed,
        }
    }
}

/// One discovered replica as shown by the info endpoint
#[derive(Debug, Clone, Serialize)]
pub struct InstanceInfo {
    pub instance_id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub uri: String,
    pub labels: BTreeMap<String, String>,
}

impl From<PeerInstance> for InstanceInfo {
    fn from(peer: PeerInstance) -> Self {
        Self {
            name: peer.display_name().to_string(),
            uri: peer.base_url(),
            instance_id: peer.id,
            host: peer.host,
            port: peer.port,
            labels: peer.labels,
        }
    }
}

/// Response body of `GET /api/cache/info`
#[derive(Debug, Clone, Serialize)]
pub struct InfoResponse {
    pub service: String,
    pub discovered_instances: Vec<InstanceInfo>,
    pub instance_count: usize,
    pub cache_names: Vec<String>,
}

impl InfoResponse {
    pub fn new(service: impl Into<String>, peers: Vec<PeerInstance>, cache_names: Vec<String>) -> Self {
        let discovered_instances: Vec<InstanceInfo> = peers.into_iter().map(Into::into).collect();
        Self {
            service: service.into(),
            instance_count: discovered_instances.len(),
            discovered_instances,
            cache_names,
        }
    }
}

/// Statistics of one named cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
