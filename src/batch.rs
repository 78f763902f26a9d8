//! Batch Loader Module
//!
//! Sequential paginated fetching: repeatedly requests pages from a fetch
//! function and concatenates the results, stopping on a short page, a page
//! budget, or a caller-supplied predicate.

use std::future::Future;

use tracing::debug;

use crate::error::Result;

/// Items requested per page when the caller does not specify.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Page budget when the caller does not specify.
pub const DEFAULT_MAX_BATCHES: usize = 10;

// == Batch Config ==
/// Configuration for a batch load.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of items requested per page
    pub page_size: usize,
    /// Maximum number of pages to fetch
    pub max_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_batches: DEFAULT_MAX_BATCHES,
        }
    }
}

// == Batch Load ==
/// Fetches up to `max_batches` pages sequentially and concatenates the items.
///
/// Stops early when a page comes back short (fewer than `page_size` items
/// signals exhaustion). See [`batch_load_until`] for an additional stop
/// predicate.
pub async fn batch_load<T, F, Fut>(config: &BatchConfig, fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    batch_load_until(config, fetch_page, |_: &[T]| false).await
}

/// [`batch_load`] with a stop predicate over the accumulated items.
///
/// Pages are fetched strictly sequentially starting at page 0, and items
/// are appended in page order; downstream consumers may rely on that
/// ordering. The predicate is evaluated only after a full page has been
/// appended, never mid-page, so the accumulator can overshoot a threshold
/// by up to one page.
///
/// A failed page fetch propagates immediately and discards everything
/// accumulated so far.
pub async fn batch_load_until<T, F, Fut, P>(
    config: &BatchConfig,
    mut fetch_page: F,
    stop: P,
) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
    P: Fn(&[T]) -> bool,
{
    let mut items = Vec::new();

    for page in 0..config.max_batches {
        let batch = fetch_page(page, config.page_size).await?;
        let batch_len = batch.len();
        items.extend(batch);
        debug!(page, batch_len, total = items.len(), "batch page fetched");

        // A short page signals exhaustion
        if batch_len < config.page_size {
            break;
        }
        if stop(&items) {
            debug!(page, total = items.len(), "stop condition satisfied");
            break;
        }
    }

    Ok(items)
}
