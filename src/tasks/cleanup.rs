//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! Lazy purge-on-read keeps lookups correct on its own; the sweeper only
//! bounds how long dead entries linger in memory between reads.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::QueryCache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps.
///
/// # Arguments
/// * `cache` - Handle to the cache to sweep
/// * `every` - Interval between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
pub fn spawn_cleanup_task(cache: QueryCache, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = every.as_millis() as u64, "starting TTL cleanup task");

        loop {
            tokio::time::sleep(every).await;

            let removed = cache.cleanup_expired().await;

            if removed > 0 {
                info!(removed, "TTL cleanup removed expired entries");
            } else {
                debug!("TTL cleanup found no expired entries");
            }
        }
    })
}
