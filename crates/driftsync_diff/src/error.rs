//! Error types for patch operations.

use thiserror::Error;

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors that can occur when parsing or applying a patch.
///
/// These are sentinels, not fatal conditions: a failed apply means the
/// content has diverged from what the patch expects, and the caller is
/// expected to restart from current content rather than abort.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// The patch text does not follow the unified-diff grammar.
    #[error("malformed patch: {0}")]
    Malformed(String),

    /// The content no longer matches the context recorded in the patch.
    #[error("context mismatch at content line {line}")]
    ContextMismatch {
        /// 1-based line number in the content where matching failed.
        line: usize,
    },
}

impl PatchError {
    /// Creates a `Malformed` error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
