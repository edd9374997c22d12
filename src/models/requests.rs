//! Request DTOs for the cache node API
//!
//! Defines the structure of incoming HTTP request bodies and queries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for `POST /cache`
///
/// `ttl_ms` is what peers send when forwarding, so sub-second TTLs survive the
/// hop; clients normally send `ttl_seconds`. When both are absent the node's
/// default TTL applies.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    /// Any JSON value; required, though it may be `null`
    pub value: Value,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }

    /// TTL to store the entry with; `ttl_ms` wins over `ttl_seconds`.
    pub fn ttl(&self, default_ttl: Duration) -> Duration {
        match (self.ttl_ms, self.ttl_seconds) {
            (Some(ms), _) => Duration::from_millis(ms),
            (None, Some(secs)) => Duration::from_secs(secs),
            (None, None) => default_ttl,
        }
    }
}

/// Body a node sends when forwarding a write to the key's owner.
#[derive(Debug, Serialize)]
pub struct ForwardedSetRequest<'a> {
    pub key: &'a str,
    pub value: Value,
    pub ttl_ms: u64,
}

/// Query string of `GET /cache?key=...`
#[derive(Debug, Clone, Deserialize)]
pub struct GetQuery {
    #[serde(default)]
    pub key: Option<String>,
}

/// Checks a key is non-empty and within `MAX_KEY_LENGTH` bytes.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
