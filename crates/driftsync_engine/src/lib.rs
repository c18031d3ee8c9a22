//! # driftsync Engine
//!
//! Local-first edit-history and two-replica sync-diff engine.
//!
//! This crate provides:
//! - Content cache: the newest known content per file
//! - Sync baseline store: the last state both replicas agreed on
//! - Edit history store: per-file session logs of reversible patches
//! - Sync diff calculator: three-way push/pull/conflict classification
//!
//! ## Architecture
//!
//! User edits flow through the content cache; the edit history records each
//! edit as a **cumulative** patch against the session base, re-derived on
//! every call from current cache content plus the tail diff. A sync pass
//! hands a fresh remote snapshot, the persisted baseline, and the set of
//! files with open sessions to [`classify`], and the orchestrator (outside
//! this crate) executes the resulting plan, updating the baseline and
//! inserting session boundaries on success.
//!
//! ## Key Invariants
//!
//! - At most one open session per file; its patch reverse-applies against
//!   current cache content to the last-boundary state
//! - History is append/overwrite only at the tail; restores are recorded as
//!   forward diffs, never as rewrites
//! - Conflicts are detected and surfaced, never silently merged
//! - No error escapes the edit-history API: reconstruction failures recover
//!   locally and an unavailable store degrades every operation to a benign
//!   no-op
//!
//! The engine performs no network I/O; all operations are bounded CPU work
//! plus local store round-trips.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod baseline;
mod cache;
mod classify;
mod error;
mod history;
mod types;

pub use baseline::BaselineStore;
pub use cache::ContentCache;
pub use classify::{classify, FileConflict, SyncPlan, RESERVED_FILE_IDS};
pub use error::{EngineError, EngineResult};
pub use history::{DiffOrigin, EditHistory, HistoricDiff, RecordOutcome};
pub use types::{
    content_checksum, BaselineFile, CachedFile, DiffRecord, EditHistoryEntry, RemoteFile,
    RemoteSnapshot, SyncBaseline,
};
