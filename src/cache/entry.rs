//! Cache Entry Module
//!
//! A single stored value and its absolute expiry time.
//!
//! Expiry is measured on the monotonic clock (`Instant`), so wall-clock
//! adjustments on the host never shorten or extend a TTL. Entries are never
//! persisted or shipped between nodes, so no wall-clock form is needed.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Instant the entry expires; `None` when the TTL is too large to
    /// represent, which means it never expires in practice
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to the
    /// expiration time, so a zero TTL produces an entry that is never served.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}
