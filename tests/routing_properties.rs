//! Property Tests for Ring Ownership and Routing
//!
//! Runs whole clusters in-process: each node is a `RoutingService` and peers
//! talk through a loopback client that writes straight into the owner's store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use ringcache::cache::{shared, CacheStore, SharedStore};
use ringcache::routing::Route;
use ringcache::{CacheError, HashRing, Node, RemoteClient, Result, RoutingService};

const TTL: Duration = Duration::from_secs(60);

// == Test Transport ==

/// Delivers calls directly into a peer's store and counts them.
struct LoopbackClient {
    store: SharedStore,
    calls: AtomicUsize,
}

impl LoopbackClient {
    fn new(store: SharedStore) -> Self {
        Self {
            store,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RemoteClient for LoopbackClient {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.store
            .write()
            .await
            .set(key.to_string(), value.to_string(), ttl);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.store.write().await.get(key)
    }
}

// == Helpers ==

fn node_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("node-{}", i)).collect()
}

fn build_ring(ids: &[String], replicas: u32) -> HashRing {
    ids.iter()
        .fold(HashRing::builder(), |builder, id| {
            builder.add_node(Node::new(id, "127.0.0.1", 8080), replicas)
        })
        .build()
        .unwrap()
}

struct Cluster {
    services: Vec<RoutingService>,
    stores: Vec<SharedStore>,
}

/// Builds one service per node. `connected` decides whether node `from`
/// holds a client for node `to`.
fn cluster(count: usize, connected: impl Fn(usize, usize) -> bool) -> Cluster {
    let ids = node_ids(count);
    let ring = Arc::new(build_ring(&ids, 16));
    let stores: Vec<SharedStore> = (0..count).map(|_| shared(CacheStore::new())).collect();

    let services = (0..count)
        .map(|from| {
            let remotes: HashMap<String, Arc<dyn RemoteClient>> = (0..count)
                .filter(|&to| to != from && connected(from, to))
                .map(|to| {
                    let client: Arc<dyn RemoteClient> =
                        Arc::new(LoopbackClient::new(stores[to].clone()));
                    (ids[to].clone(), client)
                })
                .collect();
            RoutingService::new(ring.clone(), &ids[from], stores[from].clone(), remotes)
        })
        .collect();

    Cluster { services, stores }
}

fn index_of(id: &str) -> usize {
    id.trim_start_matches("node-").parse().unwrap()
}

// == Ring Properties ==

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Same membership and replica count give the same owner, however the
    // ring was assembled.
    #[test]
    fn prop_ring_lookup_is_deterministic(
        count in 1usize..8,
        replicas in 1u32..40,
        keys in prop::collection::vec("[a-z0-9:_-]{1,32}", 1..50)
    ) {
        let ids = node_ids(count);
        let mut reversed = ids.clone();
        reversed.reverse();

        let ring = build_ring(&ids, replicas);
        let rebuilt = build_ring(&reversed, replicas);

        prop_assert_eq!(ring.len(), count * replicas as usize);
        for key in &keys {
            let owner = ring.get_node(key);
            prop_assert_eq!(owner, ring.get_node(key));
            prop_assert_eq!(owner, rebuilt.get_node(key));
        }
    }
}

#[test]
fn test_replicas_smooth_distribution() {
    const SAMPLE: usize = 20_000;

    for count in [3usize, 4, 5, 8] {
        let ring = build_ring(&node_ids(count), 256);
        let mut owned: HashMap<String, usize> = HashMap::new();

        for i in 0..SAMPLE {
            let key = format!("user:{}:profile", i);
            *owned.entry(ring.get_node(&key).id.clone()).or_default() += 1;
        }

        let limit = 2.0 / count as f64;
        for (id, keys) in &owned {
            let share = *keys as f64 / SAMPLE as f64;
            assert!(
                share < limit,
                "{} of {} nodes owns {:.3} of the keys (limit {:.3})",
                id,
                count,
                share,
                limit
            );
        }
        assert_eq!(owned.len(), count, "every node should own some keys");
    }
}

// == Routing Properties ==

#[derive(Debug, Clone)]
struct Write {
    via: usize,
    key: String,
    value: String,
}

fn write_strategy(nodes: usize) -> impl Strategy<Value = Write> {
    (0..nodes, "k[0-9]{1,2}", "[a-z]{1,8}").prop_map(|(via, key, value)| Write { via, key, value })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // With every peer registered each key lives only on its owner, and every
    // node reads back the last value written through any node.
    #[test]
    fn prop_connected_cluster_has_single_owner(
        writes in prop::collection::vec(write_strategy(3), 1..40)
    ) {
        let cluster = cluster(3, |_, _| true);
        let mut expected: HashMap<String, String> = HashMap::new();

        tokio_test::block_on(async {
            for write in &writes {
                cluster.services[write.via]
                    .route_set(&write.key, &write.value, TTL)
                    .await
                    .unwrap();
                expected.insert(write.key.clone(), write.value.clone());
            }

            for (key, value) in &expected {
                let owner = index_of(&cluster.services[0].owner_of(key).id);
                for (index, store) in cluster.stores.iter().enumerate() {
                    let held = store.write().await.get(key).is_ok();
                    prop_assert_eq!(held, index == owner, "key {} on node {}", key, index);
                }
                for service in &cluster.services {
                    prop_assert_eq!(&service.route_get(key).await.unwrap(), value);
                }
            }
            Ok(())
        })?;

        let fallbacks: u64 = cluster.services.iter().map(|s| s.stats().fallback).sum();
        prop_assert_eq!(fallbacks, 0);
    }

    // Without clients for each other, two nodes fall back to their own stores
    // for the same key and disagree about its value.
    #[test]
    fn prop_fallback_breaks_single_owner(
        key in "[a-z0-9]{1,16}",
        first in "[a-z]{1,8}",
        second in "[A-Z]{1,8}"
    ) {
        let cluster = cluster(3, |_, _| false);
        let owner = index_of(&cluster.services[0].owner_of(&key).id);
        let (a, b) = match owner {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };

        tokio_test::block_on(async {
            for (via, value) in [(a, &first), (b, &second)] {
                let service = &cluster.services[via];
                let is_fallback = matches!(service.resolve(&key), Route::Fallback { .. });
                prop_assert!(is_fallback, "node {} should fall back for {}", via, key);
                service.route_set(&key, value, TTL).await.unwrap();
            }

            prop_assert_eq!(&cluster.services[a].route_get(&key).await.unwrap(), &first);
            prop_assert_eq!(&cluster.services[b].route_get(&key).await.unwrap(), &second);
            // The true owner never saw either write
            prop_assert_eq!(
                cluster.services[owner].route_get(&key).await,
                Err(CacheError::NotFound(key.clone()))
            );
            Ok(())
        })?;
    }
}

// == Scenario Tests ==

#[tokio::test]
async fn test_remote_owner_receives_exactly_one_call() {
    let ids = node_ids(2);
    let ring = Arc::new(build_ring(&ids, 16));
    let peer_store = shared(CacheStore::new());
    let client = Arc::new(LoopbackClient::new(peer_store.clone()));

    let mut remotes: HashMap<String, Arc<dyn RemoteClient>> = HashMap::new();
    remotes.insert(ids[1].clone(), client.clone());
    let local_store = shared(CacheStore::new());
    let service = RoutingService::new(ring.clone(), &ids[0], local_store.clone(), remotes);

    let key = (0..10_000)
        .map(|i| format!("b{}", i))
        .find(|k| ring.get_node(k).id == ids[1])
        .unwrap();

    service.route_set(&key, "2", TTL).await.unwrap();

    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(peer_store.write().await.get(&key).unwrap(), "2");
    assert!(local_store.read().await.is_empty());
}

#[tokio::test]
async fn test_ttl_expiry_through_remote_owner() {
    let cluster = cluster(2, |_, _| true);
    let key = (0..10_000)
        .map(|i| format!("t{}", i))
        .find(|k| cluster.services[0].owner_of(k).id == "node-1")
        .unwrap();

    cluster.services[0]
        .route_set(&key, "v", Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(cluster.services[0].route_get(&key).await.unwrap(), "v");

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(
        cluster.services[0].route_get(&key).await,
        Err(CacheError::Expired(key.clone()))
    );
    assert_eq!(
        cluster.services[1].route_get(&key).await,
        Err(CacheError::NotFound(key.clone()))
    );
}

#[tokio::test]
async fn test_concurrent_routing_keeps_every_write() {
    let cluster = Arc::new(cluster(3, |_, _| true));
    let mut handles = vec![];

    for i in 0..90 {
        let cluster = cluster.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("c{}", i);
            cluster.services[i % 3]
                .route_set(&key, &i.to_string(), TTL)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let total: usize = {
        let mut total = 0;
        for store in &cluster.stores {
            total += store.read().await.len();
        }
        total
    };
    assert_eq!(total, 90);

    for i in 0..90 {
        let key = format!("c{}", i);
        let value = cluster.services[(i + 1) % 3].route_get(&key).await.unwrap();
        assert_eq!(value, i.to_string());
    }
}
