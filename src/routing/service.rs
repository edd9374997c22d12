//! Routing Service
//!
//! Decides per request whether a key is served by the local store or
//! forwarded to the peer that owns it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::SharedStore;
use crate::error::Result;
use crate::ring::{HashRing, Node};
use crate::routing::RemoteClient;

// == Route ==
/// Where a request for a given key is dispatched.
pub enum Route<'a> {
    /// This node owns the key
    Local,
    /// A peer owns the key and a client for it is registered
    Remote {
        owner: &'a Node,
        client: &'a Arc<dyn RemoteClient>,
    },
    /// A peer owns the key but no client is registered for it; the local
    /// store serves the request instead, at the cost of single ownership
    Fallback { owner: &'a Node },
}

impl Route<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Local => "local",
            Route::Remote { .. } => "remote",
            Route::Fallback { .. } => "fallback",
        }
    }
}

// == Routing Stats ==
#[derive(Debug, Default)]
struct RouteCounters {
    local: AtomicU64,
    forwarded: AtomicU64,
    fallback: AtomicU64,
}

/// Snapshot of how requests have been dispatched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingStats {
    pub local: u64,
    pub forwarded: u64,
    pub fallback: u64,
}

// == Routing Service ==
/// Ties ring ownership to local or remote dispatch.
///
/// Remote calls are awaited without holding the store lock. A registered
/// client's result is returned verbatim; only a missing client triggers the
/// local fallback.
pub struct RoutingService {
    ring: Arc<HashRing>,
    local_node_id: String,
    store: SharedStore,
    remotes: HashMap<String, Arc<dyn RemoteClient>>,
    counters: RouteCounters,
}

impl RoutingService {
    pub fn new(
        ring: Arc<HashRing>,
        local_node_id: impl Into<String>,
        store: SharedStore,
        remotes: HashMap<String, Arc<dyn RemoteClient>>,
    ) -> Self {
        let local_node_id = local_node_id.into();
        if !ring.contains(&local_node_id) {
            warn!(
                "Local node {} is not a ring member; it will never own a key",
                local_node_id
            );
        }
        Self {
            ring,
            local_node_id,
            store,
            remotes,
            counters: RouteCounters::default(),
        }
    }

    pub fn local_node_id(&self) -> &str {
        &self.local_node_id
    }

    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Node that owns `key` on the ring.
    pub fn owner_of(&self, key: &str) -> &Node {
        self.ring.get_node(key)
    }

    // == Resolve ==
    /// Decides where a request for `key` goes, without performing it.
    pub fn resolve(&self, key: &str) -> Route<'_> {
        let owner = self.ring.get_node(key);
        if owner.id == self.local_node_id {
            return Route::Local;
        }
        match self.remotes.get(&owner.id) {
            Some(client) => Route::Remote { owner, client },
            None => Route::Fallback { owner },
        }
    }

    // == Route Set ==
    pub async fn route_set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        match self.resolve(key) {
            Route::Local => {
                self.counters.local.fetch_add(1, Ordering::Relaxed);
                debug!("Serving set of {} locally", key);
                self.local_set(key, value, ttl).await
            }
            Route::Remote { owner, client } => {
                self.counters.forwarded.fetch_add(1, Ordering::Relaxed);
                debug!("Forwarding set of {} to owner {}", key, owner.id);
                client.set(key, value, ttl).await
            }
            Route::Fallback { owner } => {
                self.record_fallback("set", key, owner);
                self.local_set(key, value, ttl).await
            }
        }
    }

    // == Route Get ==
    pub async fn route_get(&self, key: &str) -> Result<String> {
        match self.resolve(key) {
            Route::Local => {
                self.counters.local.fetch_add(1, Ordering::Relaxed);
                debug!("Serving get of {} locally", key);
                self.local_get(key).await
            }
            Route::Remote { owner, client } => {
                self.counters.forwarded.fetch_add(1, Ordering::Relaxed);
                debug!("Forwarding get of {} to owner {}", key, owner.id);
                client.get(key).await
            }
            Route::Fallback { owner } => {
                self.record_fallback("get", key, owner);
                self.local_get(key).await
            }
        }
    }

    // == Local Access ==
    /// Writes to this node's store regardless of ownership.
    pub async fn local_set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.store
            .write()
            .await
            .set(key.to_string(), value.to_string(), ttl);
        Ok(())
    }

    /// Reads from this node's store regardless of ownership.
    pub async fn local_get(&self, key: &str) -> Result<String> {
        self.store.write().await.get(key)
    }

    pub fn stats(&self) -> RoutingStats {
        RoutingStats {
            local: self.counters.local.load(Ordering::Relaxed),
            forwarded: self.counters.forwarded.load(Ordering::Relaxed),
            fallback: self.counters.fallback.load(Ordering::Relaxed),
        }
    }

    fn record_fallback(&self, op: &str, key: &str, owner: &Node) {
        self.counters.fallback.fetch_add(1, Ordering::Relaxed);
        warn!(
            "No client registered for owner {} of {}; serving {} from local store",
            owner.id, key, op
        );
    }
}
