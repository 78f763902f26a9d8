//! Error types for the loading toolkit
//!
//! Provides unified error handling using thiserror.
//!
//! The cache itself never produces errors: lookups that miss, expire, or
//! fail to decode all surface as `None`. Errors in this crate originate
//! from caller-supplied producers (normalized through [`anyhow::Error`])
//! or from spawned source tasks that panicked or were cancelled.

use thiserror::Error;

// == Load Error Enum ==
/// Unified error type for load operations.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A caller-supplied producer returned an error
    #[error(transparent)]
    Producer(#[from] anyhow::Error),

    /// A spawned source task panicked or was cancelled before settling
    #[error("source task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LoadError {
    /// Wraps an arbitrary message into a producer error.
    ///
    /// Used to normalize stringly-typed failures into a proper error
    /// value before they reach loader state or an error map.
    pub fn message(msg: impl Into<String>) -> Self {
        LoadError::Producer(anyhow::anyhow!(msg.into()))
    }
}

// == Result Type Alias ==
/// Convenience Result type for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;
