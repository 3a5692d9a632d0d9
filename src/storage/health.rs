//! Per-slot inspection of the snapshot chain, used by `olivetti doctor`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{read_snapshot, SnapshotSlot, SnapshotStore};

/// Status of one slot in the chain.
#[derive(Debug, Serialize)]
pub struct SlotReport {
    pub slot: String,
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: u64,
    /// `None` when the slot is missing; `Some(Err(..))` when present but unreadable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Result<SlotSummary, String>>,
}

#[derive(Debug, Serialize)]
pub struct SlotSummary {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub encoder: String,
    pub dimensions: usize,
    pub banks: usize,
    pub samples: usize,
}

/// Whole-chain report.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub slots: Vec<SlotReport>,
    /// A stale temp file means a save was interrupted before its final rename.
    pub stale_temp_file: bool,
}

impl HealthReport {
    /// The slot `load()` would pick, if any.
    pub fn recoverable_slot(&self) -> Option<&SlotReport> {
        self.slots
            .iter()
            .find(|s| matches!(s.summary, Some(Ok(_))))
    }

    pub fn primary_ok(&self) -> bool {
        self.slots
            .first()
            .is_some_and(|s| matches!(s.summary, Some(Ok(_))))
    }
}

/// Inspect the primary snapshot and each backup slot without modifying anything.
pub fn check_snapshot_health(store: &SnapshotStore) -> HealthReport {
    let slots = store
        .slots()
        .map(|slot| inspect_slot(store, slot))
        .collect();

    HealthReport {
        slots,
        stale_temp_file: store.temp_path().exists(),
    }
}

fn inspect_slot(store: &SnapshotStore, slot: SnapshotSlot) -> SlotReport {
    let path = store.slot_path(slot);
    let size_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    let summary = match read_snapshot(&path) {
        Ok(None) => None,
        Ok(Some(snapshot)) => Some(Ok(SlotSummary {
            version: snapshot.version,
            saved_at: snapshot.saved_at,
            encoder: snapshot.encoder.clone(),
            dimensions: snapshot.dimensions,
            banks: snapshot.banks.len(),
            samples: snapshot.sample_count(),
        })),
        Err(reason) => Some(Err(reason)),
    };

    SlotReport {
        slot: slot.to_string(),
        exists: path.exists(),
        path,
        size_bytes,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::Snapshot;
    use tempfile::TempDir;

    #[test]
    fn reports_missing_and_corrupt_slots() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("state.json"), 2).unwrap();
        store.save(&Snapshot::empty("hashing-sha256", 8)).unwrap();
        store.save(&Snapshot::empty("hashing-sha256", 8)).unwrap();
        std::fs::write(store.path(), b"{ not json").unwrap();

        let report = check_snapshot_health(&store);
        assert_eq!(report.slots.len(), 3);
        assert!(!report.primary_ok());
        assert!(matches!(report.slots[0].summary, Some(Err(_))));
        assert!(matches!(report.slots[1].summary, Some(Ok(_))));
        assert!(report.slots[2].summary.is_none());
        assert!(!report.slots[2].exists);
        assert_eq!(report.recoverable_slot().unwrap().slot, ".bak");
        assert!(!report.stale_temp_file);
    }

    #[test]
    fn detects_stale_temp_file() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("state.json"), 1).unwrap();
        std::fs::write(store.temp_path(), b"partial").unwrap();
        let report = check_snapshot_health(&store);
        assert!(report.stale_temp_file);
        assert!(report.recoverable_slot().is_none());
    }
}
