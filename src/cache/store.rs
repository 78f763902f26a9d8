//! Cache Store Module
//!
//! Synchronous cache engine combining HashMap storage with LRU tracking and
//! TTL expiration. Wrapped by [`QueryCache`](crate::cache::QueryCache) for
//! shared async access.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};
use crate::config::CacheConfig;

// == Cache Store ==
/// Key-value store with per-entry TTL and LRU eviction at capacity.
///
/// Lookup misses are not errors here: absent, expired, and undecodable
/// entries all read as `None`. Expired entries are purged lazily on read;
/// [`cleanup_expired`](CacheStore::cleanup_expired) sweeps the rest.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Access order for LRU eviction: front = most recent, back = least
    order: VecDeque<String>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries before eviction kicks in
    max_entries: usize,
    /// TTL applied when the caller does not supply one
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            stats: CacheStats::new(),
            max_entries: config.max_entries,
            default_ttl: config.default_ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the stored value if present and not expired. An expired entry
    /// is removed on the spot and reads as `None`.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.untrack(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                debug!(key, "cache entry expired on read");
                None
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.touch(key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair, overwriting any existing entry and resetting
    /// its TTL.
    ///
    /// Inserting a new key while at capacity evicts the least recently used
    /// entry first.
    pub fn set(&mut self, key: String, value: Value, ttl: Option<Duration>) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.max_entries > 0 && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.order.pop_back() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "evicted least recently used entry");
            }
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        self.touch(&key);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Remove ==
    /// Removes a single entry by exact key. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.untrack(key);
            self.stats.set_total_entries(self.entries.len());
        }
        existed
    }

    // == Clear All ==
    /// Empties the entire cache. Statistics counters are retained.
    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.untrack(&key);
            self.stats.record_expiration();
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns a snapshot of current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == LRU Tracking ==
    /// Marks a key as most recently used.
    fn touch(&mut self, key: &str) {
        self.untrack(key);
        self.order.push_front(key.to_string());
    }

    /// Drops a key from the access order.
    fn untrack(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }
}
