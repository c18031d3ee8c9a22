//! Sync diff calculator: three-way classification of every file.
//!
//! A pure comparison of three independent snapshots - the last-synced local
//! baseline, a freshly fetched remote listing, and the set of locally
//! modified files - deciding per file whether it must be pushed, pulled,
//! has conflicted, or is settled.
//!
//! Checksum (or name) equality is the only "did anything change" oracle.
//! There is no causal ordering: the classifier cannot distinguish "only one
//! side changed" from "both sides changed to the same value independently",
//! and the conflict branch deliberately over-reports rather than risk
//! silent data loss.

use crate::types::{RemoteSnapshot, SyncBaseline};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};

/// File ids the classifier never reports: the engine's own metadata records
/// stored alongside user files in the remote replica.
pub const RESERVED_FILE_IDS: &[&str] = &[".driftsync-meta"];

/// A file changed on both replicas since the last agreed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConflict {
    /// Stable file identifier.
    pub file_id: String,
    /// Checksum the local replica last agreed on.
    pub local_checksum: String,
    /// Checksum the remote replica holds now.
    pub remote_checksum: String,
    /// Modification time the local replica last agreed on.
    pub local_modified: DateTime<Utc>,
    /// Modification time the remote replica holds now.
    pub remote_modified: DateTime<Utc>,
}

/// Per-file sync actions decided by [`classify`].
///
/// Every file id appears in at most one field; settled files are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncPlan {
    /// Changed locally only: push to the remote.
    pub to_push: Vec<String>,
    /// Changed remotely only: pull from the remote.
    pub to_pull: Vec<String>,
    /// Changed on both sides: surface to the user, never auto-merge.
    pub conflicts: Vec<FileConflict>,
    /// Edited here, deleted there: ambiguous, must not auto-resolve.
    pub edit_delete_conflicts: Vec<String>,
    /// Known locally, never seen remotely.
    pub local_only: Vec<String>,
    /// Known remotely, never seen locally.
    pub remote_only: Vec<String>,
}

impl SyncPlan {
    /// Returns true if no file needs any action.
    pub fn is_settled(&self) -> bool {
        self.to_push.is_empty()
            && self.to_pull.is_empty()
            && self.conflicts.is_empty()
            && self.edit_delete_conflicts.is_empty()
            && self.local_only.is_empty()
            && self.remote_only.is_empty()
    }
}

/// Classifies every file across the three inputs into a [`SyncPlan`].
///
/// `locally_modified` is the set of file ids with an open edit session.
/// The classification, in priority order per file:
///
/// 1. local, not remote: `edit_delete_conflicts` if locally changed with a
///    prior baseline, else `local_only`
/// 2. remote, not local: `remote_only`
/// 3. changed on both sides: `conflicts`
/// 4. changed locally only: `to_push`
/// 5. changed remotely only: `to_pull`
/// 6. neither: omitted
pub fn classify(
    baseline: &SyncBaseline,
    remote: &RemoteSnapshot,
    locally_modified: &HashSet<String>,
) -> SyncPlan {
    let ids: BTreeSet<&str> = baseline
        .files
        .keys()
        .chain(remote.files.keys())
        .chain(locally_modified.iter())
        .map(String::as_str)
        .collect();

    let mut plan = SyncPlan::default();
    for id in ids {
        if RESERVED_FILE_IDS.contains(&id) {
            continue;
        }
        let base = baseline.files.get(id);
        let remote_file = remote.files.get(id);
        let local_changed = locally_modified.contains(id);

        match (base, remote_file) {
            (base, None) => {
                if local_changed && base.is_some() {
                    plan.edit_delete_conflicts.push(id.to_owned());
                } else {
                    plan.local_only.push(id.to_owned());
                }
            }
            (None, Some(_)) => {
                if local_changed {
                    plan.to_push.push(id.to_owned());
                } else {
                    plan.remote_only.push(id.to_owned());
                }
            }
            (Some(b), Some(r)) => {
                // The remote moved since this replica last synced: checksum
                // or name differs from what the baseline recorded.
                let remote_changed = b.checksum != r.checksum
                    || b.name.as_ref().is_some_and(|name| *name != r.name);
                if local_changed && remote_changed {
                    plan.conflicts.push(FileConflict {
                        file_id: id.to_owned(),
                        local_checksum: b.checksum.clone(),
                        remote_checksum: r.checksum.clone(),
                        local_modified: b.modified_time,
                        remote_modified: r.modified_time,
                    });
                } else if local_changed {
                    plan.to_push.push(id.to_owned());
                } else if remote_changed {
                    plan.to_pull.push(id.to_owned());
                }
                // Neither changed: settled, omitted.
            }
        }
    }
    plan
}
