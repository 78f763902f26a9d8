//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold before LRU eviction
    pub max_entries: usize,
    /// Default TTL for entries stored without an explicit TTL
    pub default_ttl: Duration,
    /// Background expiry sweep interval
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LOADKIT_MAX_ENTRIES` - Maximum cache entries (default: 1024)
    /// - `LOADKIT_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 60000)
    /// - `LOADKIT_CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 30000)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("LOADKIT_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            default_ttl: env::var("LOADKIT_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(60_000)),
            cleanup_interval: env::var("LOADKIT_CLEANUP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(30_000)),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            default_ttl: Duration::from_millis(60_000),
            cleanup_interval: Duration::from_millis(30_000),
        }
    }
}
