//! In-memory store implementation.

use crate::error::{StoreError, StoreResult};
use crate::store::{Collection, LocalStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory [`LocalStore`].
///
/// This store keeps all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral sessions that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use driftsync_store::{Collection, LocalStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.put(Collection::FileCache, "file-1", b"hello".to_vec()).unwrap();
/// let value = store.get(Collection::FileCache, "file-1").unwrap();
/// assert_eq!(value.as_deref(), Some(&b"hello"[..]));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(Collection, String), Vec<u8>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with [`StoreError::Unavailable`].
    ///
    /// Used in tests to exercise the degraded-storage path.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of records in `collection`.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.records
            .read()
            .keys()
            .filter(|(c, _)| *c == collection)
            .count()
    }

    /// Returns true if `collection` holds no records.
    #[must_use]
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    /// Clears all records in all collections.
    pub fn clear(&self) {
        self.records.write().clear();
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("memory store marked unavailable"))
        } else {
            Ok(())
        }
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, collection: Collection, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.check_available()?;
        Ok(self
            .records
            .read()
            .get(&(collection, key.to_owned()))
            .cloned())
    }

    fn put(&self, collection: Collection, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.check_available()?;
        self.records
            .write()
            .insert((collection, key.to_owned()), value);
        Ok(())
    }

    fn delete(&self, collection: Collection, key: &str) -> StoreResult<()> {
        self.check_available()?;
        self.records.write().remove(&(collection, key.to_owned()));
        Ok(())
    }

    fn keys(&self, collection: Collection) -> StoreResult<Vec<String>> {
        self.check_available()?;
        Ok(self
            .records
            .read()
            .keys()
            .filter(|(c, _)| *c == collection)
            .map(|(_, k)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty(Collection::FileCache));
        assert!(store.is_empty(Collection::EditHistory));
    }

    #[test]
    fn memory_put_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .put(Collection::FileCache, "a", b"one".to_vec())
            .unwrap();

        let value = store.get(Collection::FileCache, "a").unwrap();
        assert_eq!(value.as_deref(), Some(&b"one"[..]));
    }

    #[test]
    fn memory_put_replaces_whole_record() {
        let store = MemoryStore::new();
        store
            .put(Collection::FileCache, "a", b"long initial value".to_vec())
            .unwrap();
        store
            .put(Collection::FileCache, "a", b"short".to_vec())
            .unwrap();

        let value = store.get(Collection::FileCache, "a").unwrap();
        assert_eq!(value.as_deref(), Some(&b"short"[..]));
    }

    #[test]
    fn memory_get_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.get(Collection::FileCache, "nope").unwrap().is_none());
    }

    #[test]
    fn memory_collections_are_independent_keyspaces() {
        let store = MemoryStore::new();
        store
            .put(Collection::FileCache, "a", b"cache".to_vec())
            .unwrap();
        store
            .put(Collection::EditHistory, "a", b"history".to_vec())
            .unwrap();

        assert_eq!(
            store.get(Collection::FileCache, "a").unwrap().as_deref(),
            Some(&b"cache"[..])
        );
        assert_eq!(
            store.get(Collection::EditHistory, "a").unwrap().as_deref(),
            Some(&b"history"[..])
        );
    }

    #[test]
    fn memory_delete_removes_record() {
        let store = MemoryStore::new();
        store
            .put(Collection::EditHistory, "a", b"x".to_vec())
            .unwrap();
        store.delete(Collection::EditHistory, "a").unwrap();

        assert!(store.get(Collection::EditHistory, "a").unwrap().is_none());
    }

    #[test]
    fn memory_delete_missing_is_noop() {
        let store = MemoryStore::new();
        assert!(store.delete(Collection::EditHistory, "nope").is_ok());
    }

    #[test]
    fn memory_keys_lists_collection_only() {
        let store = MemoryStore::new();
        store.put(Collection::EditHistory, "a", vec![1]).unwrap();
        store.put(Collection::EditHistory, "b", vec![2]).unwrap();
        store.put(Collection::FileCache, "c", vec![3]).unwrap();

        let mut keys = store.keys(Collection::EditHistory).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn memory_unavailable_fails_every_operation() {
        let store = MemoryStore::new();
        store.put(Collection::FileCache, "a", vec![1]).unwrap();
        store.set_unavailable(true);

        assert!(store.get(Collection::FileCache, "a").is_err());
        assert!(store.put(Collection::FileCache, "a", vec![2]).is_err());
        assert!(store.delete(Collection::FileCache, "a").is_err());
        assert!(store.keys(Collection::FileCache).is_err());

        store.set_unavailable(false);
        assert_eq!(
            store.get(Collection::FileCache, "a").unwrap(),
            Some(vec![1])
        );
    }

    #[test]
    fn memory_clear() {
        let store = MemoryStore::new();
        store.put(Collection::FileTree, "t", vec![0]).unwrap();
        store.clear();
        assert!(store.is_empty(Collection::FileTree));
    }
}
