//! Record types shared across the engine.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Computes the content checksum used as the engine's sole change oracle.
///
/// This is an equality oracle, not an integrity guarantee: two contents are
/// considered "the same" exactly when their checksums match.
pub fn content_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// The latest known content of one file.
///
/// One record per file, owned exclusively by the content cache. Overwritten
/// whole on every successful read or local save; never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFile {
    /// Stable file identifier.
    pub file_id: String,
    /// Full file content.
    pub content: String,
    /// Checksum of `content`.
    pub checksum: String,
    /// Modification time reported by the producing side.
    pub modified_time: DateTime<Utc>,
    /// When this record was written into the cache.
    pub cached_at: DateTime<Utc>,
    /// Display name, if known.
    pub name: Option<String>,
}

impl CachedFile {
    /// Builds a record for `content`, computing the checksum and stamping
    /// the cache time.
    pub fn new(
        file_id: impl Into<String>,
        name: Option<String>,
        content: impl Into<String>,
        modified_time: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        let checksum = content_checksum(&content);
        Self {
            file_id: file_id.into(),
            content,
            checksum,
            modified_time,
            cached_at: Utc::now(),
            name,
        }
    }
}

/// Per-file state recorded at the last successful synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineFile {
    /// Checksum at last sync.
    pub checksum: String,
    /// Modification time at last sync.
    pub modified_time: DateTime<Utc>,
    /// Name at last sync, if recorded.
    pub name: Option<String>,
}

/// The last state both replicas agreed on.
///
/// A single record under a fixed key. Mutated only by the sync orchestrator
/// after a confirmed push or pull; read-only to the engine otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBaseline {
    /// When the baseline was last written.
    pub last_updated_at: DateTime<Utc>,
    /// Per-file baseline state, keyed by file id.
    pub files: BTreeMap<String, BaselineFile>,
}

impl SyncBaseline {
    /// An empty baseline: no file has ever been synced.
    pub fn empty() -> Self {
        Self {
            last_updated_at: DateTime::UNIX_EPOCH,
            files: BTreeMap::new(),
        }
    }
}

/// Metadata for one file in a freshly fetched remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Remote display name.
    pub name: String,
    /// Remote MIME type.
    pub mime_type: String,
    /// Remote content checksum.
    pub checksum: String,
    /// Remote modification time.
    pub modified_time: DateTime<Utc>,
    /// Remote creation time, if reported.
    pub created_time: Option<DateTime<Utc>>,
}

/// A point-in-time listing of the remote replica.
///
/// Supplied fresh by the transport on each sync attempt and handed to the
/// classifier unchanged; never persisted by the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    /// When the snapshot was taken.
    pub last_updated_at: DateTime<Utc>,
    /// Per-file remote metadata, keyed by file id.
    pub files: BTreeMap<String, RemoteFile>,
}

/// One record in a file's edit history.
///
/// A record with an empty `diff` is a **session boundary marker**: it closes
/// the edit session before it and is not a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
    /// Unified-diff text; empty for a boundary marker.
    pub diff: String,
    /// Added-line count.
    pub additions: usize,
    /// Removed-line count.
    pub deletions: usize,
}

impl DiffRecord {
    /// Creates a patch record.
    pub fn new(timestamp: DateTime<Utc>, diff: String, additions: usize, deletions: usize) -> Self {
        Self {
            timestamp,
            diff,
            additions,
            deletions,
        }
    }

    /// Creates a session boundary marker.
    pub fn boundary(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            diff: String::new(),
            additions: 0,
            deletions: 0,
        }
    }

    /// Returns true if this record is a session boundary marker.
    pub fn is_boundary(&self) -> bool {
        self.diff.is_empty()
    }
}

/// The ordered session log of one file.
///
/// # Invariants
///
/// - The list is append/overwrite only at its tail; no record before the
///   last boundary is ever mutated
/// - At most one open session exists at any time: after the last boundary
///   there is zero or one non-boundary record, holding the *cumulative*
///   change since that boundary
/// - The open session's patch, reverse-applied to the cache's current
///   content, reconstructs the content at the last boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditHistoryEntry {
    /// Stable file identifier.
    pub file_id: String,
    /// Path of the file as last seen.
    pub file_path: String,
    /// Ordered records, oldest first.
    pub diffs: Vec<DiffRecord>,
}

impl EditHistoryEntry {
    /// Creates an entry with no records yet.
    pub fn new(file_id: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            file_path: file_path.into(),
            diffs: Vec::new(),
        }
    }

    /// The open session's record: the tail, if it is not a boundary.
    pub fn open_session(&self) -> Option<&DiffRecord> {
        self.diffs.last().filter(|r| !r.is_boundary())
    }

    /// Returns true if no record carries an actual patch.
    pub fn is_all_boundaries(&self) -> bool {
        self.diffs.iter().all(DiffRecord::is_boundary)
    }
}

/// Encodes a record as CBOR.
pub(crate) fn encode<T: Serialize>(value: &T) -> EngineResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).map_err(|e| EngineError::codec(e.to_string()))?;
    Ok(buf)
}

/// Decodes a CBOR record.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> EngineResult<T> {
    ciborium::de::from_reader(bytes).map_err(|e| EngineError::codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_an_equality_oracle() {
        assert_eq!(content_checksum("same"), content_checksum("same"));
        assert_ne!(content_checksum("same"), content_checksum("other"));
    }

    #[test]
    fn cached_file_computes_checksum() {
        let file = CachedFile::new("id-1", Some("notes.txt".into()), "hello", Utc::now());
        assert_eq!(file.checksum, content_checksum("hello"));
    }

    #[test]
    fn boundary_marker_is_empty_diff() {
        let boundary = DiffRecord::boundary(Utc::now());
        assert!(boundary.is_boundary());

        let patch = DiffRecord::new(Utc::now(), "@@ -1,1 +1,1 @@\n-a\n+b\n".into(), 1, 1);
        assert!(!patch.is_boundary());
    }

    #[test]
    fn open_session_is_non_boundary_tail() {
        let mut entry = EditHistoryEntry::new("id-1", "notes.txt");
        assert!(entry.open_session().is_none());

        entry
            .diffs
            .push(DiffRecord::new(Utc::now(), "@@ -1,1 +1,1 @@\n-a\n+b\n".into(), 1, 1));
        assert!(entry.open_session().is_some());

        entry.diffs.push(DiffRecord::boundary(Utc::now()));
        assert!(entry.open_session().is_none());
        assert!(!entry.is_all_boundaries());
    }

    #[test]
    fn record_cbor_roundtrip() {
        let entry = EditHistoryEntry {
            file_id: "id-1".into(),
            file_path: "dir/notes.txt".into(),
            diffs: vec![
                DiffRecord::new(Utc::now(), "@@ -1,1 +1,1 @@\n-a\n+b\n".into(), 1, 1),
                DiffRecord::boundary(Utc::now()),
            ],
        };
        let bytes = encode(&entry).unwrap();
        let decoded: EditHistoryEntry = decode(&bytes).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn decode_rejects_garbage() {
        let result: EngineResult<EditHistoryEntry> = decode(&[0xff, 0x00, 0x13]);
        assert!(result.is_err());
    }
}
