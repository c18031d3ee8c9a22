//! Sync baseline store: the last state both replicas agreed on.

use crate::error::EngineResult;
use crate::types::{decode, encode, SyncBaseline};
use driftsync_store::{Collection, LocalStore};
use std::sync::Arc;
use tracing::warn;

/// Fixed key of the single baseline record.
const BASELINE_KEY: &str = "baseline";

/// Store facade for the single [`SyncBaseline`] record.
///
/// The baseline is the reference point for "has anything changed since we
/// last agreed with the remote". It is written only by the sync orchestrator
/// after a confirmed push or pull; the engine reads it. Deliberately
/// decoupled from the content cache: a file can be cached while its baseline
/// is stale.
#[derive(Clone)]
pub struct BaselineStore {
    store: Arc<dyn LocalStore>,
}

impl BaselineStore {
    /// Creates a baseline store over the given store.
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Loads the baseline. A missing or corrupted record loads as the empty
    /// baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn load(&self) -> EngineResult<SyncBaseline> {
        let Some(bytes) = self.store.get(Collection::SyncBaseline, BASELINE_KEY)? else {
            return Ok(SyncBaseline::empty());
        };
        match decode(&bytes) {
            Ok(baseline) => Ok(baseline),
            Err(e) => {
                warn!(error = %e, "discarding corrupted baseline record");
                Ok(SyncBaseline::empty())
            }
        }
    }

    /// Replaces the baseline record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or encoding fails.
    pub fn save(&self, baseline: &SyncBaseline) -> EngineResult<()> {
        let bytes = encode(baseline)?;
        self.store
            .put(Collection::SyncBaseline, BASELINE_KEY, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BaselineFile;
    use chrono::Utc;
    use driftsync_store::MemoryStore;

    #[test]
    fn missing_record_loads_empty() {
        let store = BaselineStore::new(Arc::new(MemoryStore::new()));
        let baseline = store.load().unwrap();
        assert!(baseline.files.is_empty());
    }

    #[test]
    fn save_load_roundtrip() {
        let store = BaselineStore::new(Arc::new(MemoryStore::new()));
        let mut baseline = SyncBaseline::empty();
        baseline.last_updated_at = Utc::now();
        baseline.files.insert(
            "id-1".into(),
            BaselineFile {
                checksum: "abc".into(),
                modified_time: Utc::now(),
                name: Some("notes.txt".into()),
            },
        );

        store.save(&baseline).unwrap();
        assert_eq!(store.load().unwrap(), baseline);
    }

    #[test]
    fn corrupted_record_loads_empty() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .put(Collection::SyncBaseline, BASELINE_KEY, vec![0xff])
            .unwrap();

        let store = BaselineStore::new(memory);
        assert!(store.load().unwrap().files.is_empty());
    }
}
