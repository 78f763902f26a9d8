//! loadkit - Async data-loading toolkit
//!
//! Provides a TTL query cache with a cached-fetch wrapper, a stateful data
//! loader with a timeout guard, a sequential batch loader for paginated
//! sources, and a parallel loader with per-key error isolation.

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod parallel;
pub mod tasks;

pub use batch::{batch_load, batch_load_until, BatchConfig};
pub use cache::{CacheStats, QueryCache};
pub use config::CacheConfig;
pub use error::{LoadError, Result};
pub use loader::{DataLoader, LoaderOptions, LoaderState};
pub use parallel::{ParallelLoader, ParallelOutcome};
pub use tasks::spawn_cleanup_task;
