//! Local store trait definition.

use crate::error::StoreResult;

/// The logical collections a [`LocalStore`] keeps.
///
/// Each collection is an independent keyspace; a key is unique within its
/// collection, not across collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Latest known content per file, keyed by file id.
    FileCache,
    /// The single sync-baseline record (fixed key).
    SyncBaseline,
    /// Edit history, keyed by file id.
    EditHistory,
    /// Auxiliary file-tree cache; not read by the sync core.
    FileTree,
}

impl Collection {
    /// Stable name of the collection, used as a storage namespace.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::FileCache => "file_cache",
            Collection::SyncBaseline => "sync_baseline",
            Collection::EditHistory => "edit_history",
            Collection::FileTree => "file_tree",
        }
    }
}

/// A keyed local store for driftsync state.
///
/// Stores are **opaque byte stores** - they do not interpret the records
/// they hold. All record encoding belongs to the caller.
///
/// # Invariants
///
/// - `put` replaces the whole record atomically; readers never observe a
///   partially written value
/// - `get` returns exactly the bytes of the last `put` for that key, or
///   `None` if the key was never written or was deleted
/// - Implementations must be `Send + Sync` for concurrent access
pub trait LocalStore: Send + Sync {
    /// Reads the record under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the read fails.
    fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Writes `value` under `key`, replacing any existing record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the write fails.
    fn put(&self, collection: Collection, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Deletes the record under `key`. Deleting an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the delete fails.
    fn delete(&self, collection: Collection, key: &str) -> StoreResult<()>;

    /// Lists all keys currently present in `collection`.
    ///
    /// Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the scan fails.
    fn keys(&self, collection: Collection) -> StoreResult<Vec<String>>;
}
