//! HTTP Remote Client
//!
//! [`RemoteClient`] implementation that forwards requests to a peer node's
//! `/cache` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::{decode_payload, encode_payload, ForwardedSetRequest, GetResponse};
use crate::ring::Node;
use crate::routing::RemoteClient;

/// Header marking a request as already routed by the named node.
pub const FORWARDED_HEADER: &str = "x-ringcache-forwarded-by";

// == HTTP Remote Client ==
/// Talks to one peer node over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    client: reqwest::Client,
    base_url: String,
    /// Peer this client targets
    node_id: String,
    /// Node sending the requests, stamped into `FORWARDED_HEADER`
    origin_id: String,
}

impl HttpRemoteClient {
    /// Creates a client for `target` sharing the given connection pool.
    pub fn new(client: reqwest::Client, origin_id: impl Into<String>, target: &Node) -> Self {
        Self {
            client,
            base_url: target.base_url(),
            node_id: target.id.clone(),
            origin_id: origin_id.into(),
        }
    }

    /// Builds the connection pool shared by every peer client of a node.
    pub fn build_pool(timeout: Duration) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("failed to build HTTP client: {}", e)))
    }

    fn unavailable(&self, reason: impl ToString) -> CacheError {
        CacheError::RemoteUnavailable {
            node: self.node_id.clone(),
            reason: reason.to_string(),
        }
    }

    /// Turns a non-success response into the error the peer reported.
    async fn error_from(&self, key: &str, response: reqwest::Response) -> CacheError {
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => CacheError::NotFound(key.to_string()),
            StatusCode::GONE => CacheError::Expired(key.to_string()),
            _ => {
                let detail = response
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
                    .unwrap_or_default();
                self.unavailable(format!("{} {}", status, detail).trim_end())
            }
        }
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        debug!("Forwarding set of {} to {}", key, self.node_id);

        let body = ForwardedSetRequest {
            key,
            value: decode_payload(value),
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        };
        let response = self
            .client
            .post(format!("{}/cache", self.base_url))
            .header(FORWARDED_HEADER, &self.origin_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.error_from(key, response).await)
        }
    }

    async fn get(&self, key: &str) -> Result<String> {
        debug!("Forwarding get of {} to {}", key, self.node_id);

        let response = self
            .client
            .get(format!("{}/cache", self.base_url))
            .header(FORWARDED_HEADER, &self.origin_id)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        if !response.status().is_success() {
            return Err(self.error_from(key, response).await);
        }

        let body: GetResponse = response
            .json()
            .await
            .map_err(|e| self.unavailable(format!("malformed response: {}", e)))?;
        Ok(encode_payload(&body.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_peer_is_remote_unavailable() {
        // Port 9 (discard) on localhost is not served by anything in the test env
        let pool = HttpRemoteClient::build_pool(Duration::from_millis(500)).unwrap();
        let client = HttpRemoteClient::new(pool, "node1", &Node::new("node2", "127.0.0.1", 9));

        let err = client.get("k").await.unwrap_err();
        assert!(
            matches!(err, CacheError::RemoteUnavailable { ref node, .. } if node == "node2"),
            "{err:?}"
        );

        let err = client.set("k", "v", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, CacheError::RemoteUnavailable { .. }));
    }

    #[test]
    fn test_client_targets_node_base_url() {
        let pool = reqwest::Client::new();
        let client = HttpRemoteClient::new(pool, "node1", &Node::new("node3", "cache-3", 8083));
        assert_eq!(client.node_id, "node3");
        assert_eq!(client.base_url, "http://cache-3:8083");
    }
}
