//! Edit history store: per-file session logs of reversible patches.
//!
//! Each file's history is an ordered list of [`DiffRecord`]s; an empty diff
//! is a session boundary marker. The suffix after the last boundary holds at
//! most one record, carrying the *cumulative* change since that boundary, so
//! a single reverse-apply against the cache's current content reconstructs
//! the session-start state.
//!
//! The session base is never cached: it is re-derived on every call from
//! current cache content plus the tail diff. That re-derivation is what
//! makes interleaved autosaves and boundary insertions self-healing, and it
//! is the correctness anchor of the engine.

use crate::cache::ContentCache;
use crate::error::EngineResult;
use crate::types::{decode, encode, DiffRecord, EditHistoryEntry};
use chrono::Utc;
use driftsync_diff::{compute_diff, reverse_apply};
use driftsync_store::{Collection, LocalStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Context lines kept around each change in recorded diffs.
const DEFAULT_CONTEXT_LINES: usize = 3;

/// Result of recording an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The history entry was created or its open session updated.
    Updated(EditHistoryEntry),
    /// Nothing changed, or persistence is unavailable.
    NoOp,
    /// The open session was undone back to its base and the entry removed.
    Reverted,
}

/// Where a historic diff came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOrigin {
    /// Recorded by this replica; its new side is guaranteed present.
    Local,
    /// Recorded by the remote replica; its new side may not exist here yet.
    Remote,
}

/// One diff in a reconstruction walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricDiff {
    /// Unified-diff text.
    pub diff: String,
    /// Origin of the diff.
    pub origin: DiffOrigin,
}

impl HistoricDiff {
    /// A locally recorded diff.
    pub fn local(diff: impl Into<String>) -> Self {
        Self {
            diff: diff.into(),
            origin: DiffOrigin::Local,
        }
    }

    /// A remotely recorded diff.
    pub fn remote(diff: impl Into<String>) -> Self {
        Self {
            diff: diff.into(),
            origin: DiffOrigin::Remote,
        }
    }
}

/// Per-file edit history over an injected local store.
///
/// All public operations degrade to benign results when the store is
/// unavailable; no error escapes this type.
#[derive(Clone)]
pub struct EditHistory {
    store: Arc<dyn LocalStore>,
    cache: ContentCache,
    context_lines: usize,
}

impl EditHistory {
    /// Creates an edit history over the given store.
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            cache: ContentCache::new(store.clone()),
            store,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    /// Overrides the context width of recorded diffs.
    #[must_use]
    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Records a local edit taking the file to `new_content`.
    ///
    /// Must be called **before** the content cache is updated with
    /// `new_content`: the cache's current content is the edit's old side.
    /// Repeated calls within one session overwrite the tail record with the
    /// cumulative diff since the session base; an edit that restores the
    /// base exactly collapses the session.
    pub fn record_edit(&self, file_id: &str, file_path: &str, new_content: &str) -> RecordOutcome {
        match self.try_record_edit(file_id, file_path, new_content) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(file_id, error = %e, "history store unreachable; edit not recorded");
                RecordOutcome::NoOp
            }
        }
    }

    /// Closes the open session, if any, with a boundary marker.
    ///
    /// Idempotent: a second call with no intervening edit changes nothing.
    pub fn add_boundary(&self, file_id: &str) {
        if let Err(e) = self.try_add_boundary(file_id) {
            warn!(file_id, error = %e, "history store unreachable; boundary not recorded");
        }
    }

    /// Reads the history entry for `file_id`, if any.
    pub fn entry(&self, file_id: &str) -> Option<EditHistoryEntry> {
        match self.try_entry(file_id) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(file_id, error = %e, "history store unreachable; no entry returned");
                None
            }
        }
    }

    /// Removes the history entry for `file_id`.
    pub fn delete(&self, file_id: &str) {
        if let Err(e) = self.store.delete(Collection::EditHistory, file_id) {
            warn!(file_id, error = %e, "history store unreachable; entry not deleted");
        }
    }

    /// Walks `newest_first` from newest to oldest, reverse-applying each
    /// diff to step `current_content` back in time.
    ///
    /// Boundary markers are ignored. A diff that no longer applies is
    /// skipped and the walk continues: for a remote diff this is expected
    /// (its new side may not have been pulled yet); for a local diff it
    /// means a corrupted record.
    pub fn reconstruct(current_content: &str, newest_first: &[HistoricDiff]) -> String {
        let mut content = current_content.to_owned();
        for record in newest_first {
            if record.diff.is_empty() {
                continue;
            }
            match reverse_apply(&content, &record.diff) {
                Ok(previous) => content = previous,
                Err(e) => match record.origin {
                    DiffOrigin::Local => {
                        warn!(error = %e, "skipping unreconstructable local diff")
                    }
                    DiffOrigin::Remote => {
                        debug!(error = %e, "remote diff has no local counterpart yet; skipping")
                    }
                },
            }
        }
        content
    }

    /// Returns true if the file's recorded history amounts to an actual
    /// change relative to its pre-history content.
    ///
    /// Reconstructs the pre-session baseline by reverse-applying all
    /// non-boundary local diffs against the cache's current content. Used to
    /// keep files that were edited and then reverted out of push candidate
    /// sets.
    pub fn has_net_change(&self, file_id: &str) -> bool {
        match self.try_has_net_change(file_id) {
            Ok(changed) => changed,
            Err(e) => {
                warn!(file_id, error = %e, "history store unreachable; assuming no net change");
                false
            }
        }
    }

    /// Restores the file to the state reached by reverse-applying
    /// `diffs_to_target`, recording the restore itself as a new forward
    /// diff bracketed by boundary markers.
    ///
    /// History stays append-only: the fact that a restore happened is never
    /// erased. Returns the restored content, or `None` if the store is
    /// unreachable.
    pub fn restore_to_entry(
        &self,
        file_id: &str,
        current_content: &str,
        diffs_to_target: &[HistoricDiff],
    ) -> Option<String> {
        match self.try_restore_to_entry(file_id, current_content, diffs_to_target) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(file_id, error = %e, "history store unreachable; restore not recorded");
                None
            }
        }
    }

    /// Ids of files with an open edit session carrying a net change.
    ///
    /// This is the `locally modified` input of the sync classifier.
    pub fn modified_file_ids(&self) -> HashSet<String> {
        match self.try_modified_file_ids() {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "history store unreachable; reporting no modified files");
                HashSet::new()
            }
        }
    }

    fn try_record_edit(
        &self,
        file_id: &str,
        file_path: &str,
        new_content: &str,
    ) -> EngineResult<RecordOutcome> {
        let old_content = self
            .cache
            .get(file_id)?
            .map(|f| f.content)
            .unwrap_or_default();
        let mut entry = self
            .try_entry(file_id)?
            .unwrap_or_else(|| EditHistoryEntry::new(file_id, file_path));
        entry.file_path = file_path.to_owned();

        let mut open = entry.open_session().is_some();
        let mut session_abandoned = false;
        let base = if open {
            let tail_diff = entry
                .diffs
                .last()
                .map(|r| r.diff.clone())
                .unwrap_or_default();
            match reverse_apply(&old_content, &tail_diff) {
                Ok(base) => base,
                Err(e) => {
                    warn!(
                        file_id, error = %e,
                        "open session no longer reconstructable; starting a new session"
                    );
                    entry.diffs.push(DiffRecord::boundary(Utc::now()));
                    open = false;
                    session_abandoned = true;
                    old_content.clone()
                }
            }
        } else {
            old_content.clone()
        };

        let diff = compute_diff(&base, new_content, self.context_lines);
        if diff.is_empty() {
            if open {
                // The user undid the whole session.
                entry.diffs.pop();
                if entry.is_all_boundaries() {
                    self.store.delete(Collection::EditHistory, file_id)?;
                    return Ok(RecordOutcome::Reverted);
                }
                self.save_entry(&entry)?;
                return Ok(RecordOutcome::NoOp);
            }
            if session_abandoned {
                self.save_entry(&entry)?;
            }
            return Ok(RecordOutcome::NoOp);
        }

        let record = DiffRecord::new(Utc::now(), diff.text, diff.additions, diff.deletions);
        if open {
            if let Some(tail) = entry.diffs.last_mut() {
                *tail = record;
            }
        } else {
            entry.diffs.push(record);
        }
        self.save_entry(&entry)?;
        Ok(RecordOutcome::Updated(entry))
    }

    fn try_add_boundary(&self, file_id: &str) -> EngineResult<()> {
        let Some(mut entry) = self.try_entry(file_id)? else {
            return Ok(());
        };
        if entry.open_session().is_some() {
            entry.diffs.push(DiffRecord::boundary(Utc::now()));
            self.save_entry(&entry)?;
        }
        Ok(())
    }

    fn try_has_net_change(&self, file_id: &str) -> EngineResult<bool> {
        let Some(entry) = self.try_entry(file_id)? else {
            return Ok(false);
        };
        let newest_first: Vec<HistoricDiff> = entry
            .diffs
            .iter()
            .rev()
            .filter(|r| !r.is_boundary())
            .map(|r| HistoricDiff::local(r.diff.clone()))
            .collect();
        if newest_first.is_empty() {
            return Ok(false);
        }
        let current = self
            .cache
            .get(file_id)?
            .map(|f| f.content)
            .unwrap_or_default();
        Ok(Self::reconstruct(&current, &newest_first) != current)
    }

    fn try_restore_to_entry(
        &self,
        file_id: &str,
        current_content: &str,
        diffs_to_target: &[HistoricDiff],
    ) -> EngineResult<String> {
        let target = Self::reconstruct(current_content, diffs_to_target);
        if target == current_content {
            return Ok(target);
        }
        let mut entry = self
            .try_entry(file_id)?
            .unwrap_or_else(|| EditHistoryEntry::new(file_id, file_id));
        let now = Utc::now();
        if entry.open_session().is_some() {
            entry.diffs.push(DiffRecord::boundary(now));
        }
        let diff = compute_diff(current_content, &target, self.context_lines);
        entry
            .diffs
            .push(DiffRecord::new(now, diff.text, diff.additions, diff.deletions));
        entry.diffs.push(DiffRecord::boundary(now));
        self.save_entry(&entry)?;
        Ok(target)
    }

    fn try_modified_file_ids(&self) -> EngineResult<HashSet<String>> {
        let mut ids = HashSet::new();
        for file_id in self.store.keys(Collection::EditHistory)? {
            let Some(entry) = self.try_entry(&file_id)? else {
                continue;
            };
            if entry.open_session().is_some() && self.try_has_net_change(&file_id)? {
                ids.insert(file_id);
            }
        }
        Ok(ids)
    }

    fn try_entry(&self, file_id: &str) -> EngineResult<Option<EditHistoryEntry>> {
        let Some(bytes) = self.store.get(Collection::EditHistory, file_id)? else {
            return Ok(None);
        };
        match decode(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(file_id, error = %e, "discarding corrupted history record");
                Ok(None)
            }
        }
    }

    fn save_entry(&self, entry: &EditHistoryEntry) -> EngineResult<()> {
        let bytes = encode(entry)?;
        self.store
            .put(Collection::EditHistory, &entry.file_id, bytes)?;
        Ok(())
    }
}
