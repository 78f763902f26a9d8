//! Loader Options Module
//!
//! Configuration recognized by [`DataLoader`](crate::loader::DataLoader).

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::QueryCache;
use crate::error::LoadError;

/// How long a fetch may run before the loading flag is cleared.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Callback invoked with the loaded value after a successful fetch.
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Callback invoked with the failure after an unsuccessful fetch.
pub type ErrorCallback = Arc<dyn Fn(&LoadError) + Send + Sync>;

// == Loader Options ==
/// Configuration for a [`DataLoader`](crate::loader::DataLoader).
///
/// All fields have usable defaults; construct with struct-update syntax:
///
/// ```ignore
/// let options = LoaderOptions {
///     cache: Some(cache.clone()),
///     cache_key: Some("wellness_data:u1:week".into()),
///     ..LoaderOptions::default()
/// };
/// ```
pub struct LoaderOptions<T> {
    /// Cache to route fetches through; requires `cache_key` to take effect
    pub cache: Option<QueryCache>,
    /// Key under which fetched values are cached. When absent the fetch
    /// function is called directly on every load.
    pub cache_key: Option<String>,
    /// TTL forwarded to the cache; `None` uses the cache-wide default
    pub cache_ttl: Option<Duration>,
    /// Seed value shown before the first fetch resolves
    pub initial_data: Option<T>,
    /// Values whose change triggers a new fetch (shallow comparison)
    pub dependencies: Vec<Value>,
    /// When false, no fetch is ever performed
    pub enabled: bool,
    /// Timeout guard for the loading flag
    pub timeout: Duration,
    /// Invoked after each successful load
    pub on_success: Option<SuccessCallback<T>>,
    /// Invoked after each failed load
    pub on_error: Option<ErrorCallback>,
}

impl<T> Default for LoaderOptions<T> {
    fn default() -> Self {
        Self {
            cache: None,
            cache_key: None,
            cache_ttl: None,
            initial_data: None,
            dependencies: Vec::new(),
            enabled: true,
            timeout: DEFAULT_LOAD_TIMEOUT,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> LoaderOptions<T> {
    /// Options routing fetches through `cache` under `key`.
    pub fn cached(cache: QueryCache, key: impl Into<String>) -> Self {
        Self {
            cache: Some(cache),
            cache_key: Some(key.into()),
            ..Self::default()
        }
    }
}
