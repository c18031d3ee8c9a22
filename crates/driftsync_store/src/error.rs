//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store is not accessible in the current execution context.
    ///
    /// Consumers are expected to treat this as "persistence is off" and
    /// degrade to in-memory-only behavior, not as a fatal condition.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupted record: {0}")]
    Corrupted(String),
}

impl StoreError {
    /// Creates an `Unavailable` error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a `Corrupted` error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }

    /// Returns true if this error means the store cannot be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_predicate() {
        assert!(StoreError::unavailable("private browsing").is_unavailable());
        assert!(!StoreError::corrupted("bad cbor").is_unavailable());
    }

    #[test]
    fn error_display() {
        let err = StoreError::unavailable("no backend");
        assert_eq!(err.to_string(), "store unavailable: no backend");

        let err = StoreError::corrupted("truncated");
        assert!(err.to_string().contains("truncated"));
    }
}
