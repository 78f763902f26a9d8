//! Parallel Loader Module
//!
//! Fans out independently named async sources, isolating failures per key
//! so one failing source does not block the others.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::error::{LoadError, Result};

type SourceFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

// == Parallel Outcome ==
/// Aggregate of a parallel load.
///
/// Every input key lands in exactly one of `results` or `errors`; a key
/// that failed is absent from `results` entirely, so callers distinguish
/// "missing due to error" from "legitimately empty" by key presence.
#[derive(Debug)]
pub struct ParallelOutcome<T> {
    /// Successfully loaded values by source key
    pub results: HashMap<String, T>,
    /// Failures by source key
    pub errors: HashMap<String, LoadError>,
    /// True iff at least one source failed
    pub has_errors: bool,
}

impl<T> ParallelOutcome<T> {
    fn new(results: HashMap<String, T>, errors: HashMap<String, LoadError>) -> Self {
        let has_errors = !errors.is_empty();
        Self {
            results,
            errors,
            has_errors,
        }
    }
}

// == Parallel Loader ==
/// Builder for a fan-out of named async sources.
///
/// Registering the same key twice keeps only the later source's outcome,
/// mirroring map insertion.
pub struct ParallelLoader<T> {
    sources: Vec<(String, SourceFuture<T>)>,
}

impl<T> Default for ParallelLoader<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ParallelLoader<T>
where
    T: Send + 'static,
{
    // == Constructor ==
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    // == Source ==
    /// Registers a named source.
    pub fn source(
        mut self,
        key: impl Into<String>,
        future: impl Future<Output = Result<T>> + Send + 'static,
    ) -> Self {
        self.sources.push((key.into(), Box::pin(future)));
        self
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    // == Run ==
    /// Launches all sources concurrently and waits for every one to settle.
    ///
    /// A source that fails is logged and recorded under its key in
    /// `errors` instead of failing the aggregate; a source that panics is
    /// contained in its spawned task and recorded the same way. There is
    /// no ordering guarantee among sources, but the returned key set is
    /// deterministic regardless of resolution order.
    pub async fn run(self) -> ParallelOutcome<T> {
        let handles: Vec<(String, tokio::task::JoinHandle<Result<T>>)> = self
            .sources
            .into_iter()
            .map(|(key, future)| (key, tokio::spawn(future)))
            .collect();

        debug!(sources = handles.len(), "parallel load started");

        let mut results = HashMap::new();
        let mut errors = HashMap::new();

        for (key, handle) in handles {
            match handle.await {
                Ok(Ok(value)) => {
                    results.insert(key, value);
                }
                Ok(Err(err)) => {
                    warn!(key = %key, error = %err, "parallel source failed");
                    errors.insert(key, err);
                }
                Err(join_err) => {
                    warn!(key = %key, error = %join_err, "parallel source task died");
                    errors.insert(key, LoadError::Task(join_err));
                }
            }
        }

        ParallelOutcome::new(results, errors)
    }
}
