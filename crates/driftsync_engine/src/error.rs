//! Error types for engine operations.

use driftsync_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur inside the engine.
///
/// These surface only from the cache and baseline accessors, which the sync
/// orchestrator owns. The edit-history operations resolve every failure to a
/// documented benign result instead of returning errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The underlying local store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A record could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

impl EngineError {
    /// Creates a `Codec` error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Returns true if the underlying store is unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, EngineError::Store(e) if e.is_unavailable())
    }
}
