//! Response DTOs for the cache node API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::CacheStats;
use crate::ring::Node;
use crate::routing::RoutingStats;

/// Response body for `GET /cache`
///
/// Also parsed by peers reading a forwarded get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for `POST /cache`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for `GET /ring/:key`
#[derive(Debug, Clone, Serialize)]
pub struct OwnerResponse {
    pub key: String,
    pub owner: Node,
    /// How this node would dispatch the key: `local`, `remote` or `fallback`
    pub route: String,
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub node_id: String,
    pub store: CacheStats,
    /// Hit rate of the local store (hits / (hits + misses))
    pub hit_rate: f64,
    pub routing: RoutingStats,
    /// Virtual points on the ring
    pub ring_points: usize,
}

impl StatsResponse {
    pub fn new(
        node_id: impl Into<String>,
        store: CacheStats,
        routing: RoutingStats,
        ring_points: usize,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            hit_rate: store.hit_rate(),
            store,
            routing,
            ring_points,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    pub node_id: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(node_id: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            node_id: node_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
