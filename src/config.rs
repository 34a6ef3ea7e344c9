//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::{CacheSettings, EvictionPolicy};
use crate::discovery::PeerInstance;

/// How the replica learns about its peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryConfig {
    /// A fixed member list
    Static { peers: Vec<PeerInstance> },
    /// Resolve a headless service name; `None` resolves the service name itself
    Dns { host: Option<String>, port: u16 },
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Service identity used to filter the peer directory
    pub service_name: String,
    /// Per-peer eviction call timeout in seconds
    pub sync_timeout_secs: u64,
    /// Entry TTL in seconds
    pub cache_ttl_secs: u64,
    /// Maximum entries per named cache
    pub cache_max_size: usize,
    /// Configured cache names
    pub cache_names: Vec<String>,
    pub eviction_policy: EvictionPolicy,
    /// Background expired-entry sweep interval in seconds
    pub cleanup_interval_secs: u64,
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `SERVICE_NAME` - Service identity (default: cache-sync)
    /// - `SYNC_TIMEOUT_SECS` - Per-peer call timeout (default: 5)
    /// - `CACHE_TTL_SECS` - Entry TTL (default: 600)
    /// - `CACHE_MAX_SIZE` - Entries per cache (default: 1000)
    /// - `CACHE_NAMES` - Comma separated cache names (default: products)
    /// - `CACHE_EVICTION_POLICY` - `lru` or `lrw` (default: lru)
    /// - `CLEANUP_INTERVAL_SECS` - Sweep frequency (default: 30)
    /// - `DISCOVERY_MODE` - `static` or `dns` (default: static)
    /// - `PEERS` - Static members, `[id@]host:port,...` (default: this replica)
    /// - `DISCOVERY_DNS_NAME` / `DISCOVERY_DNS_PORT` - DNS mode target
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let server_port = parse_var("SERVER_PORT").unwrap_or(defaults.server_port);

        Self {
            server_port,
            service_name: env::var("SERVICE_NAME")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.service_name),
            sync_timeout_secs: parse_var("SYNC_TIMEOUT_SECS").unwrap_or(defaults.sync_timeout_secs),
            cache_ttl_secs: parse_var("CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl_secs),
            cache_max_size: parse_var("CACHE_MAX_SIZE").unwrap_or(defaults.cache_max_size),
            cache_names: env::var("CACHE_NAMES")
                .ok()
                .map(|v| split_list(&v))
                .filter(|names| !names.is_empty())
                .unwrap_or(defaults.cache_names),
            eviction_policy: parse_var("CACHE_EVICTION_POLICY").unwrap_or(defaults.eviction_policy),
            cleanup_interval_secs: parse_var("CLEANUP_INTERVAL_SECS")
                .unwrap_or(defaults.cleanup_interval_secs),
            discovery: discovery_from_env(server_port),
        }
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            max_entries: self.cache_max_size,
            ttl: Duration::from_secs(self.cache_ttl_secs),
            policy: self.eviction_policy,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            service_name: "cache-sync".to_string(),
            sync_timeout_secs: 5,
            cache_ttl_secs: 600,
            cache_max_size: 1000,
            cache_names: vec!["products".to_string()],
            eviction_policy: EvictionPolicy::LeastRecentlyUsed,
            cleanup_interval_secs: 30,
            discovery: DiscoveryConfig::Static {
                peers: vec![self_peer(8080)],
            },
        }
    }
}

fn discovery_from_env(server_port: u16) -> DiscoveryConfig {
    let mode = env::var("DISCOVERY_MODE").unwrap_or_default();
    if mode.trim().eq_ignore_ascii_case("dns") {
        return DiscoveryConfig::Dns {
            host: env::var("DISCOVERY_DNS_NAME")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            port: parse_var("DISCOVERY_DNS_PORT").unwrap_or(server_port),
        };
    }

    let peers = env::var("PEERS")
        .map(|v| parse_peers(&v))
        .unwrap_or_default();
    if peers.is_empty() {
        DiscoveryConfig::Static {
            peers: vec![self_peer(server_port)],
        }
    } else {
        DiscoveryConfig::Static { peers }
    }
}

/// Parses a `PEERS` list, skipping malformed members.
pub fn parse_peers(value: &str) -> Vec<PeerInstance> {
    split_list(value)
        .into_iter()
        .filter_map(|entry| match entry.parse::<PeerInstance>() {
            Ok(peer) => Some(peer),
            Err(e) => {
                warn!("Ignoring peer entry: {}", e);
                None
            }
        })
        .collect()
}

fn self_peer(port: u16) -> PeerInstance {
    PeerInstance::new(format!("localhost:{port}"), "localhost", port)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.sync_timeout(), Duration::from_secs(5));
        assert_eq!(config.cache_settings().ttl, Duration::from_secs(600));
        assert_eq!(config.cache_max_size, 1000);
        assert_eq!(config.cache_names, vec!["products".to_string()]);
        assert_eq!(
            config.discovery,
            DiscoveryConfig::Static {
                peers: vec![PeerInstance::new("localhost:8080", "localhost", 8080)]
            }
        );
    }

    #[test]
    fn test_parse_peers_skips_malformed() {
        let peers = parse_peers("a@10.0.0.1:8080, broken , 10.0.0.2:9090,");
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].id, "a");
        assert_eq!(peers[1].id, "10.0.0.2:9090");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" products, orders ,,"), vec!["products", "orders"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_cleanup_interval_never_zero() {
        let config = Config {
            cleanup_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.cleanup_interval(), Duration::from_secs(1));
    }
}
