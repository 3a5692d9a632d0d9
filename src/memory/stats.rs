use serde::Serialize;
use std::collections::BTreeMap;

use crate::memory::engine::EngineState;
use crate::storage::SnapshotStore;

/// Per-bank line in a stats report.
#[derive(Debug, Clone, Serialize)]
pub struct BankStats {
    pub kind: String,
    pub lane: String,
    pub identity: String,
    pub samples: usize,
    pub capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_sample: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_sample: Option<String>,
}

/// Response from `memory_stats`.
#[derive(Debug, Serialize)]
pub struct EngineStats {
    pub total_banks: usize,
    pub total_samples: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub by_lane: BTreeMap<String, usize>,
    pub banks: Vec<BankStats>,
    pub snapshot_size_bytes: u64,
}

/// Compute engine statistics. Sample counts are grouped by kind and by lane.
pub fn engine_stats(state: &EngineState, store: &SnapshotStore) -> EngineStats {
    let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_lane: BTreeMap<String, usize> = BTreeMap::new();
    let mut banks = Vec::with_capacity(state.banks.len());

    for (key, bank) in &state.banks {
        *by_kind.entry(key.kind.as_str().to_string()).or_default() += bank.len();
        *by_lane.entry(key.lane.as_str().to_string()).or_default() += bank.len();

        let oldest = bank.samples().next().map(|s| s.created_at.to_rfc3339());
        let newest = bank.samples().last().map(|s| s.created_at.to_rfc3339());

        banks.push(BankStats {
            kind: key.kind.to_string(),
            lane: key.lane.to_string(),
            identity: key.identity.clone(),
            samples: bank.len(),
            capacity: bank.capacity(),
            oldest_sample: oldest,
            newest_sample: newest,
        });
    }

    let snapshot_size_bytes = std::fs::metadata(store.path())
        .map(|m| m.len())
        .unwrap_or(0);

    EngineStats {
        total_banks: banks.len(),
        total_samples: banks.iter().map(|b| b.samples).sum(),
        by_kind,
        by_lane,
        banks,
        snapshot_size_bytes,
    }
}
