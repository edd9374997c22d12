//! Cluster Bootstrap
//!
//! Turns a [`Config`] into a routing service: builds the ring from the static
//! membership and registers one HTTP client per peer.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::cache::SharedStore;
use crate::config::Config;
use crate::error::Result;
use crate::ring::HashRing;
use crate::routing::{HttpRemoteClient, RemoteClient, RoutingService};

/// Builds the ring and peer clients for this node.
///
/// # Errors
/// - `RingMisconfigured` if the membership yields an empty ring
/// - `Internal` if the HTTP client pool cannot be created
pub fn bootstrap(config: &Config, store: SharedStore) -> Result<RoutingService> {
    let members = config.members();

    let ring = members
        .iter()
        .cloned()
        .fold(HashRing::builder(), |builder, node| {
            builder.add_node(node, config.replicas)
        })
        .build()?;
    info!(
        "Hash ring built: {} members, {} points, {} salted",
        ring.nodes().len(),
        ring.len(),
        ring.salted_points()
    );

    let pool = HttpRemoteClient::build_pool(config.remote_timeout())?;
    let remotes: HashMap<String, Arc<dyn RemoteClient>> = ring
        .nodes()
        .iter()
        .filter(|node| node.id != config.node_id)
        .map(|node| {
            info!("Registered peer {}", node);
            let client: Arc<dyn RemoteClient> =
                Arc::new(HttpRemoteClient::new(pool.clone(), &config.node_id, node));
            (node.id.clone(), client)
        })
        .collect();

    Ok(RoutingService::new(
        Arc::new(ring),
        &config.node_id,
        store,
        remotes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{shared, CacheStore};
    use crate::error::CacheError;
    use crate::routing::Route;

    #[tokio::test]
    async fn test_bootstrap_registers_every_peer() {
        let config = Config {
            node_id: "node1".to_string(),
            cluster_nodes: "node1:8080,node2:8081,node3:8082".to_string(),
            ..Config::default()
        };

        let service = bootstrap(&config, shared(CacheStore::new())).unwrap();
        assert_eq!(service.ring().nodes().len(), 3);
        assert_eq!(service.ring().len(), 9);

        // No key is ever a fallback: every peer has a client
        for i in 0..200 {
            let key = format!("key-{}", i);
            assert_ne!(service.resolve(&key).name(), "fallback");
        }
    }

    #[tokio::test]
    async fn test_bootstrap_single_node() {
        let service = bootstrap(&Config::default(), shared(CacheStore::new())).unwrap();
        assert!(matches!(service.resolve("anything"), Route::Local));
    }

    #[tokio::test]
    async fn test_bootstrap_zero_replicas_fails() {
        let config = Config {
            replicas: 0,
            ..Config::default()
        };
        let result = bootstrap(&config, shared(CacheStore::new()));
        assert!(matches!(result, Err(CacheError::RingMisconfigured(_))));
    }
}
