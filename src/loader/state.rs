//! Loader State Module
//!
//! Defines the observable state of a single data loader.

use std::sync::Arc;

use crate::error::LoadError;

// == Loader State ==
/// Snapshot of one loader's progress: the last loaded value, whether a
/// fetch is in flight, and the last failure.
///
/// A failed load keeps the previous `data` while populating `error`, so
/// consumers can render stale data alongside an error indicator instead
/// of dropping to a blank state.
#[derive(Debug, Clone)]
pub struct LoaderState<T> {
    /// Most recently loaded value, or the seed value before the first load
    pub data: Option<T>,
    /// Whether a fetch is currently in flight
    pub is_loading: bool,
    /// Error from the most recent failed load, cleared when a load starts
    pub error: Option<Arc<LoadError>>,
}

impl<T> LoaderState<T> {
    /// Creates an idle state seeded with optional initial data.
    pub fn idle(initial_data: Option<T>) -> Self {
        Self {
            data: initial_data,
            is_loading: false,
            error: None,
        }
    }

    /// Returns true if the last load failed.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        Self::idle(None)
    }
}
