//! Configuration Module
//!
//! Handles loading node and cluster configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::ring::{Node, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity of this node on the ring
    pub node_id: String,
    /// Host peers use to reach this node
    pub node_host: String,
    /// HTTP server port
    pub node_port: u16,
    /// Static membership, `id:port` or `id:host:port` entries separated by commas
    pub cluster_nodes: String,
    /// Virtual replicas per node
    pub replicas: u32,
    /// Default TTL in seconds for writes without explicit TTL
    pub default_ttl: u64,
    /// Timeout in milliseconds for requests forwarded to peers
    pub remote_timeout_ms: u64,
    /// Seconds between expiry sweeps, 0 disables the sweeper
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `NODE_ID` - Node identity (default: node1)
    /// - `NODE_HOST` - Advertised host (default: localhost)
    /// - `NODE_PORT` - HTTP server port (default: 8080)
    /// - `CLUSTER_NODES` - Static membership (default: empty, single-node ring)
    /// - `REPLICAS` - Virtual replicas per node (default: 3)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `REMOTE_TIMEOUT_MS` - Forwarding timeout (default: 2000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 0, disabled)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            node_id: env::var("NODE_ID")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.node_id),
            node_host: env::var("NODE_HOST")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.node_host),
            node_port: env_parse("NODE_PORT").unwrap_or(defaults.node_port),
            cluster_nodes: env::var("CLUSTER_NODES").unwrap_or(defaults.cluster_nodes),
            replicas: env_parse("REPLICAS").unwrap_or(defaults.replicas),
            default_ttl: env_parse("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            remote_timeout_ms: env_parse("REMOTE_TIMEOUT_MS")
                .unwrap_or(defaults.remote_timeout_ms),
            cleanup_interval: env_parse("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// This node as a ring member.
    pub fn local_node(&self) -> Node {
        Node::new(&self.node_id, &self.node_host, self.node_port)
    }

    /// Every ring member: the configured cluster plus the local node.
    ///
    /// The local node is always present. If `CLUSTER_NODES` also lists it,
    /// the local address from `NODE_HOST`/`NODE_PORT` wins.
    pub fn members(&self) -> Vec<Node> {
        let mut members = vec![self.local_node()];
        members.extend(
            parse_cluster_nodes(&self.cluster_nodes)
                .into_iter()
                .filter(|node| node.id != self.node_id),
        );
        members
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_id: "node1".to_string(),
            node_host: "localhost".to_string(),
            node_port: 8080,
            cluster_nodes: String::new(),
            replicas: DEFAULT_REPLICAS,
            default_ttl: 300,
            remote_timeout_ms: 2000,
            cleanup_interval: 0,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Parses a comma separated membership list.
///
/// Entries are `id:port` (host defaults to the id) or `id:host:port`.
/// Blank entries are ignored; malformed ones are skipped with a warning.
pub fn parse_cluster_nodes(raw: &str) -> Vec<Node> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let node = parse_cluster_entry(entry);
            if node.is_none() {
                warn!("Skipping malformed cluster entry '{}'", entry);
            }
            node
        })
        .collect()
}

fn parse_cluster_entry(entry: &str) -> Option<Node> {
    let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
    let (id, host, port) = match parts.as_slice() {
        [id, port] => (*id, *id, *port),
        [id, host, port] => (*id, *host, *port),
        _ => return None,
    };
    if id.is_empty() || host.is_empty() {
        return None;
    }
    let port = port.parse().ok()?;
    Some(Node::new(id, host, port))
}
