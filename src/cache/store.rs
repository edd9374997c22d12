//! Cache Store Module
//!
//! Local key-value storage with per-entry TTL and lazy expiry on read.
//!
//! The store itself is not synchronized; nodes share it as a [`SharedStore`]
//! (`Arc<RwLock<CacheStore>>`) so that a read which finds an expired entry
//! removes it under the same exclusive lock.
//!
//! [`SharedStore`]: crate::cache::SharedStore

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Unbounded map of keys to expiring entries.
///
/// Expired entries stay in memory until a read touches them or
/// [`cleanup_expired`](CacheStore::cleanup_expired) sweeps them.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// Overwrites any previous entry and resets its TTL. Never fails.
    pub fn set(&mut self, key: String, value: String, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// # Errors
    /// - `NotFound` if the key is absent
    /// - `Expired` if the entry's TTL has elapsed; the entry is removed, so the
    ///   next read reports `NotFound`
    pub fn get(&mut self, key: &str) -> Result<String> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return Err(CacheError::NotFound(key.to_string()));
            }
            Some(entry) => entry.is_expired(),
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_miss();
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            return Err(CacheError::Expired(key.to_string()));
        }

        self.stats.record_hit();
        self.entries
            .get(key)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| CacheError::Internal(format!("entry for {} vanished", key)))
    }

    // == Delete ==
    /// Removes an entry by key. Idempotent: returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - self.entries.len();

        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
