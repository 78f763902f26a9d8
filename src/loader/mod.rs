//! Loader Module
//!
//! A stateful facade over one async fetch operation: tracks
//! `{data, is_loading, error}`, optionally routes through the query cache,
//! guards long fetches with a timeout, and supports explicit refetch with
//! cache invalidation.

mod data;
mod options;
mod state;

// Re-export public types
pub use data::DataLoader;
pub use options::{ErrorCallback, LoaderOptions, SuccessCallback, DEFAULT_LOAD_TIMEOUT};
pub use state::LoaderState;
