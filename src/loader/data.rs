//! Data Loader Module
//!
//! [`DataLoader`] gives calling code a uniform `{data, is_loading, error}`
//! facade over one async fetch operation, optionally routed through the
//! query cache, with a timeout guard and explicit refetch-with-invalidation.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::QueryCache;
use crate::error::Result;
use crate::loader::options::{ErrorCallback, LoaderOptions, SuccessCallback};
use crate::loader::state::LoaderState;

type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;
type FetchFn<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

// == Data Loader ==
/// Stateful facade over one async fetch operation.
///
/// Construction is inert; [`start`](DataLoader::start) performs the initial
/// load when the loader is enabled. Loads are not cancelled or sequenced:
/// overlapping [`load`](DataLoader::load) calls all run to completion and
/// the last resolution wins the final state. The timeout guard likewise
/// only clears the loading flag; the underlying fetch keeps running and a
/// late result still lands.
pub struct DataLoader<T> {
    fetch_fn: FetchFn<T>,
    cache: Option<QueryCache>,
    cache_key: Option<String>,
    cache_ttl: Option<Duration>,
    timeout: Duration,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
    enabled: Arc<AtomicBool>,
    dependencies: Arc<RwLock<Vec<Value>>>,
    state: Arc<RwLock<LoaderState<T>>>,
    /// Load counter; lets a stale timeout watchdog recognize that a newer
    /// load owns the loading flag
    generation: Arc<AtomicU64>,
}

impl<T> Clone for DataLoader<T> {
    fn clone(&self) -> Self {
        Self {
            fetch_fn: self.fetch_fn.clone(),
            cache: self.cache.clone(),
            cache_key: self.cache_key.clone(),
            cache_ttl: self.cache_ttl,
            timeout: self.timeout,
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            enabled: self.enabled.clone(),
            dependencies: self.dependencies.clone(),
            state: self.state.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<T> DataLoader<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a loader around `fetch_fn` with the given options.
    ///
    /// The fetch function is the producer invoked on every cache miss (or
    /// on every load when no cache key is configured).
    pub fn new<F, Fut>(fetch_fn: F, options: LoaderOptions<T>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let LoaderOptions {
            cache,
            cache_key,
            cache_ttl,
            initial_data,
            dependencies,
            enabled,
            timeout,
            on_success,
            on_error,
        } = options;

        let fetch_fn: FetchFn<T> = Arc::new(move || -> FetchFuture<T> { Box::pin(fetch_fn()) });

        Self {
            fetch_fn,
            cache,
            cache_key,
            cache_ttl,
            timeout,
            on_success,
            on_error,
            enabled: Arc::new(AtomicBool::new(enabled)),
            dependencies: Arc::new(RwLock::new(dependencies)),
            state: Arc::new(RwLock::new(LoaderState::idle(initial_data))),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    // == Start ==
    /// Performs the initial load if the loader is enabled.
    pub async fn start(&self) {
        if self.is_enabled() {
            self.load().await;
        }
    }

    // == Load ==
    /// Runs one full load cycle.
    ///
    /// Sets `is_loading`, clears the previous error, arms the timeout
    /// watchdog, and routes the fetch through the cache when a key is
    /// configured. On success the value replaces `data`; on failure the
    /// previous `data` is preserved and `error` is populated. The loading
    /// flag is cleared on every path.
    pub async fn load(&self) {
        if !self.is_enabled() {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let watchdog = self.spawn_watchdog(generation);
        let outcome = self.run_fetch().await;
        watchdog.abort();

        let outcome = {
            let mut state = self.state.write().await;
            let outcome = match outcome {
                Ok(value) => {
                    state.data = Some(value.clone());
                    state.error = None;
                    Ok(value)
                }
                Err(err) => {
                    let err = Arc::new(err);
                    state.error = Some(err.clone());
                    Err(err)
                }
            };
            state.is_loading = false;
            outcome
        };

        // Callbacks run outside the state lock so they may inspect the loader
        match outcome {
            Ok(value) => {
                if let Some(callback) = &self.on_success {
                    callback(&value);
                }
            }
            Err(err) => {
                debug!(cache_key = ?self.cache_key, error = %err, "load failed");
                if let Some(callback) = &self.on_error {
                    callback(&err);
                }
            }
        }
    }

    // == Refetch ==
    /// Invalidates the configured cache key, then loads.
    ///
    /// This is the supported invalidation path: it guarantees the next
    /// fetch bypasses the cache exactly once.
    pub async fn refetch(&self) {
        if let (Some(cache), Some(key)) = (&self.cache, &self.cache_key) {
            cache.clear(key).await;
            debug!(cache_key = %key, "refetch invalidated cache entry");
        }
        self.load().await;
    }

    // == Trigger ==
    /// Spawns a load in the background and returns its handle.
    pub fn trigger(&self) -> JoinHandle<()> {
        let loader = self.clone();
        tokio::spawn(async move { loader.load().await })
    }

    // == Enable Gate ==
    /// Returns whether the loader is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Changes the enable gate. Enabling a disabled loader triggers a load.
    pub async fn set_enabled(&self, enabled: bool) {
        let was_enabled = self.enabled.swap(enabled, Ordering::SeqCst);
        if enabled && !was_enabled {
            self.load().await;
        }
    }

    // == Dependencies ==
    /// Replaces the dependency values; a change triggers a load when the
    /// loader is enabled. Comparison is shallow value equality.
    pub async fn update_dependencies(&self, dependencies: Vec<Value>) {
        let changed = {
            let mut current = self.dependencies.write().await;
            if *current == dependencies {
                false
            } else {
                *current = dependencies;
                true
            }
        };
        if changed && self.is_enabled() {
            debug!(cache_key = ?self.cache_key, "dependencies changed; reloading");
            self.load().await;
        }
    }

    // == State Access ==
    /// Returns a snapshot of the loader state.
    pub async fn state(&self) -> LoaderState<T> {
        self.state.read().await.clone()
    }

    /// Returns the current data value, if any.
    pub async fn data(&self) -> Option<T> {
        self.state.read().await.data.clone()
    }

    /// Returns whether a fetch is currently in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    /// Returns the error from the most recent failed load, if any.
    pub async fn error(&self) -> Option<Arc<crate::error::LoadError>> {
        self.state.read().await.error.clone()
    }

    // == Internals ==
    async fn run_fetch(&self) -> Result<T> {
        match (&self.cache, &self.cache_key) {
            (Some(cache), Some(key)) => {
                cache
                    .fetch_with(key, self.cache_ttl, || (self.fetch_fn)())
                    .await
            }
            _ => (self.fetch_fn)().await,
        }
    }

    /// Arms the timeout guard for one load cycle.
    ///
    /// The watchdog only clears the loading flag; it does not cancel the
    /// fetch. It checks the generation counter first so that a guard
    /// outliving its own load cannot clobber a newer load's flag.
    fn spawn_watchdog(&self, generation: u64) -> JoinHandle<()> {
        let state = self.state.clone();
        let latest = self.generation.clone();
        let timeout = self.timeout;
        let cache_key = self.cache_key.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut state = state.write().await;
            if state.is_loading && latest.load(Ordering::SeqCst) == generation {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    cache_key = ?cache_key,
                    "load exceeded timeout; clearing loading flag (fetch keeps running)"
                );
                state.is_loading = false;
            }
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn counting_fetch(
        calls: Arc<AtomicUsize>,
        value: u32,
    ) -> impl Fn() -> FetchFuture<u32> + Send + Sync {
        move || -> FetchFuture<u32> {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            })
        }
    }

    #[tokio::test]
    async fn test_load_sets_data() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = DataLoader::new(counting_fetch(calls.clone(), 5), LoaderOptions::default());

        loader.start().await;

        let state = loader.state().await;
        assert_eq!(state.data, Some(5));
        assert!(!state.is_loading);
        assert!(!state.has_error());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_loader_never_fetches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = DataLoader::new(
            counting_fetch(calls.clone(), 5),
            LoaderOptions {
                enabled: false,
                ..LoaderOptions::default()
            },
        );

        loader.start().await;
        loader.load().await;

        assert!(!loader.is_loading().await);
        assert_eq!(loader.data().await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initial_data_seeds_state() {
        let loader: DataLoader<u32> = DataLoader::new(
            || async { Ok(9) },
            LoaderOptions {
                initial_data: Some(1),
                enabled: false,
                ..LoaderOptions::default()
            },
        );

        assert_eq!(loader.data().await, Some(1));
    }

    #[tokio::test]
    async fn test_failure_preserves_data_and_sets_error() {
        let should_fail = Arc::new(AtomicBool::new(false));
        let fail = should_fail.clone();
        let loader: DataLoader<u32> = DataLoader::new(
            move || {
                let fail = fail.clone();
                async move {
                    if fail.load(Ordering::SeqCst) {
                        Err(anyhow::anyhow!("backend down").into())
                    } else {
                        Ok(11)
                    }
                }
            },
            LoaderOptions::default(),
        );

        loader.start().await;
        assert_eq!(loader.data().await, Some(11));

        should_fail.store(true, Ordering::SeqCst);
        loader.load().await;

        let state = loader.state().await;
        assert_eq!(state.data, Some(11), "previous data is preserved on failure");
        assert!(state.has_error());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_load_clears_previous_error() {
        let should_fail = Arc::new(AtomicBool::new(true));
        let fail = should_fail.clone();
        let loader: DataLoader<u32> = DataLoader::new(
            move || {
                let fail = fail.clone();
                async move {
                    if fail.load(Ordering::SeqCst) {
                        Err(anyhow::anyhow!("flaky").into())
                    } else {
                        Ok(2)
                    }
                }
            },
            LoaderOptions::default(),
        );

        loader.load().await;
        assert!(loader.error().await.is_some());

        should_fail.store(false, Ordering::SeqCst);
        loader.load().await;
        assert!(loader.error().await.is_none());
        assert_eq!(loader.data().await, Some(2));
    }

    #[tokio::test]
    async fn test_callbacks_invoked() {
        let successes: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(AtomicUsize::new(0));
        let should_fail = Arc::new(AtomicBool::new(false));

        let on_success = {
            let successes = successes.clone();
            Arc::new(move |value: &u32| successes.lock().unwrap().push(*value))
        };
        let on_error = {
            let errors = errors.clone();
            Arc::new(move |_: &crate::error::LoadError| {
                errors.fetch_add(1, Ordering::SeqCst);
            })
        };

        let fail = should_fail.clone();
        let loader: DataLoader<u32> = DataLoader::new(
            move || {
                let fail = fail.clone();
                async move {
                    if fail.load(Ordering::SeqCst) {
                        Err(anyhow::anyhow!("nope").into())
                    } else {
                        Ok(4)
                    }
                }
            },
            LoaderOptions {
                on_success: Some(on_success),
                on_error: Some(on_error),
                ..LoaderOptions::default()
            },
        );

        loader.load().await;
        should_fail.store(true, Ordering::SeqCst);
        loader.load().await;

        assert_eq!(*successes.lock().unwrap(), vec![4]);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_clears_loading_flag_without_error() {
        let loader: DataLoader<u32> = DataLoader::new(
            || async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Ok(9)
            },
            LoaderOptions {
                timeout: Duration::from_millis(30),
                ..LoaderOptions::default()
            },
        );

        let handle = loader.trigger();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!loader.is_loading().await, "watchdog cleared the flag");
        assert!(loader.error().await.is_none(), "timeout is not an error");
        assert_eq!(loader.data().await, None, "fetch has not resolved yet");

        handle.await.unwrap();
        assert_eq!(loader.data().await, Some(9), "late resolution still lands");
    }

    #[tokio::test]
    async fn test_overlapping_loads_last_resolution_wins() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let loader: DataLoader<String> = DataLoader::new(
            {
                let gate = gate.clone();
                let calls = calls.clone();
                move || {
                    let gate = gate.clone();
                    let calls = calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            // First fetch blocks until released
                            gate.notified().await;
                            Ok("first".to_string())
                        } else {
                            Ok("second".to_string())
                        }
                    }
                }
            },
            LoaderOptions::default(),
        );

        let first = loader.trigger();
        tokio::time::sleep(Duration::from_millis(20)).await;

        loader.load().await;
        assert_eq!(loader.data().await, Some("second".to_string()));

        // Releasing the first fetch lets its stale result overwrite state
        gate.notify_one();
        first.await.unwrap();
        assert_eq!(loader.data().await, Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_update_dependencies_triggers_reload() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = DataLoader::new(counting_fetch(calls.clone(), 1), LoaderOptions::default());

        loader.start().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        loader
            .update_dependencies(vec![serde_json::json!("week")])
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Same values again: no reload
        loader
            .update_dependencies(vec![serde_json::json!("week")])
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dependency_change_while_disabled_does_not_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = DataLoader::new(
            counting_fetch(calls.clone(), 1),
            LoaderOptions {
                enabled: false,
                ..LoaderOptions::default()
            },
        );

        loader.update_dependencies(vec![serde_json::json!(1)]).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enabling_triggers_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = DataLoader::new(
            counting_fetch(calls.clone(), 3),
            LoaderOptions {
                enabled: false,
                ..LoaderOptions::default()
            },
        );

        loader.set_enabled(true).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.data().await, Some(3));

        // Enabling an already-enabled loader does not reload
        loader.set_enabled(true).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refetch_bypasses_cache() {
        let cache = QueryCache::default();
        cache.set("metrics", &10u32, None).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let loader = DataLoader::new(
            counting_fetch(calls.clone(), 20),
            LoaderOptions::cached(cache.clone(), "metrics"),
        );

        loader.start().await;
        assert_eq!(loader.data().await, Some(10), "initial load served from cache");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        loader.refetch().await;
        assert_eq!(loader.data().await, Some(20));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get::<u32>("metrics").await, Some(20), "refetched value is re-cached");
    }
}
