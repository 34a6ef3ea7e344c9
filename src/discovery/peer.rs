//! Peer Instance
//!
//! One addressable replica as reported by a peer directory.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Label carrying the Kubernetes pod name, preferred for log output.
pub const POD_NAME_LABEL: &str = "pod.name";

// == Peer Instance ==
/// A replica snapshot. Only valid for the dispatch that fetched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerInstance {
    /// Unique per live process
    pub id: String,
    pub host: String,
    pub port: u16,
    pub labels: BTreeMap<String, String>,
}

impl PeerInstance {
    pub fn new(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    // == Base URL ==
    /// `http://host:port`, with IPv6 hosts bracketed.
    pub fn base_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    // == Display Name ==
    /// Pod name label if set, else the id, else the host.
    pub fn display_name(&self) -> &str {
        self.labels
            .get(POD_NAME_LABEL)
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
            .or_else(|| Some(self.id.as_str()).filter(|id| !id.trim().is_empty()))
            .unwrap_or(self.host.as_str())
    }
}

impl fmt::Display for PeerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.base_url())
    }
}

// == Parsing ==
/// Parses `[id@]host:port`. Without an id, `host:port` becomes the id.
impl FromStr for PeerInstance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (id, address) = match s.split_once('@') {
            Some((id, address)) => (Some(id.trim()), address.trim()),
            None => (None, s),
        };

        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| format!("peer '{s}' is missing a port"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(format!("peer '{s}' is missing a host"));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| format!("peer '{s}' has an invalid port"))?;

        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => address.to_string(),
        };
        Ok(PeerInstance::new(id, host, port))
    }
}
