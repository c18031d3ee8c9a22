//! Content cache: the latest known content per file.

use crate::error::EngineResult;
use crate::types::{decode, encode, CachedFile};
use driftsync_store::{Collection, LocalStore};
use std::sync::Arc;
use tracing::warn;

/// Keyed store of the newest known content per file.
///
/// Last-writer-wins with whole-record replacement; no merge logic lives
/// here. The cache always reflects what the editor currently has, which may
/// be ahead of the sync baseline.
#[derive(Clone)]
pub struct ContentCache {
    store: Arc<dyn LocalStore>,
}

impl ContentCache {
    /// Creates a cache over the given store.
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Reads the cached record for `file_id`.
    ///
    /// A corrupted record is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn get(&self, file_id: &str) -> EngineResult<Option<CachedFile>> {
        let Some(bytes) = self.store.get(Collection::FileCache, file_id)? else {
            return Ok(None);
        };
        match decode(&bytes) {
            Ok(file) => Ok(Some(file)),
            Err(e) => {
                warn!(file_id, error = %e, "discarding corrupted cache record");
                Ok(None)
            }
        }
    }

    /// Replaces the cached record for the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or encoding fails.
    pub fn insert(&self, file: &CachedFile) -> EngineResult<()> {
        let bytes = encode(file)?;
        self.store.put(Collection::FileCache, &file.file_id, bytes)?;
        Ok(())
    }

    /// Removes the cached record for `file_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn remove(&self, file_id: &str) -> EngineResult<()> {
        self.store.delete(Collection::FileCache, file_id)?;
        Ok(())
    }
}
