//! Shared Cache Handle
//!
//! [`QueryCache`] is the public face of the cache: a cheaply cloneable
//! handle over an `Arc<RwLock<CacheStore>>`, passed by value to loaders
//! instead of living as hidden global state. Every clone sees the same
//! entries, and each test can construct its own isolated instance.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::error::Result;

// == Query Cache ==
/// Thread-safe TTL cache handle.
///
/// Values are stored as JSON so one cache can hold entries of different
/// concrete types; the typed accessors serialize and deserialize at the
/// boundary. Lookups never fail: absent, expired, and undecodable entries
/// all read as `None`.
#[derive(Debug, Clone)]
pub struct QueryCache {
    inner: Arc<RwLock<CacheStore>>,
}

impl QueryCache {
    // == Constructors ==
    /// Creates a cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheStore::new(config))),
        }
    }

    // == Get ==
    /// Retrieves and decodes the value stored under `key`.
    ///
    /// A stored value that does not decode as `T` means the key was reused
    /// across types; the entry is purged and the lookup reads as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_raw(key).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                debug!(key, %err, "cached value did not decode; purging entry");
                self.inner.write().await.remove(key);
                None
            }
        }
    }

    /// Retrieves the raw JSON value stored under `key`.
    pub async fn get_raw(&self, key: &str) -> Option<Value> {
        self.inner.write().await.get(key)
    }

    // == Set ==
    /// Stores a value under `key`, overwriting any existing entry.
    ///
    /// `ttl` defaults to the configured cache-wide TTL. A value that cannot
    /// be serialized is logged and dropped; the store is left untouched.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_value(value) {
            Ok(json) => self.inner.write().await.set(key.to_string(), json, ttl),
            Err(err) => warn!(key, %err, "value could not be serialized; not cached"),
        }
    }

    // == Clear ==
    /// Removes the entry stored under the exact key. Returns whether it existed.
    ///
    /// Exact-match removal is the only invalidation primitive: callers that
    /// compose keys (for example `"wellness_data:{user}:{range}"`) must
    /// rebuild them exactly to invalidate.
    pub async fn clear(&self, key: &str) -> bool {
        self.inner.write().await.remove(key)
    }

    /// Empties the entire cache.
    pub async fn clear_all(&self) {
        self.inner.write().await.clear_all();
    }

    // == Fetch With ==
    /// Returns the cached value for `key`, or invokes `producer` to compute,
    /// store, and return a fresh one.
    ///
    /// On a hit the producer is never invoked. On a miss the producer runs
    /// without holding the cache lock, so concurrent callers on the same
    /// cold key each invoke their own producer and the last store wins;
    /// acceptable for idempotent producers, and callers that need
    /// single-flight semantics must serialize above this layer.
    ///
    /// Producer failures propagate unchanged and nothing is cached.
    pub async fn fetch_with<T, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            debug!(key, "fetch_with served from cache");
            return Ok(cached);
        }

        debug!(key, "fetch_with cache miss; invoking producer");
        let value = producer().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    // == Maintenance ==
    /// Removes all expired entries. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    /// Returns a snapshot of cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
