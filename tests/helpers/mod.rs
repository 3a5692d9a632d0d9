#![allow(dead_code)]

use std::path::PathBuf;

use olivetti::config::OlivettiConfig;
use olivetti::embedding::hashing::HashingEncoder;
use olivetti::memory::types::BankLimits;
use olivetti::memory::MemoryEngine;
use olivetti::storage::SnapshotStore;
use tempfile::TempDir;

/// Snapshot path inside a temp dir.
pub fn snapshot_path(tmp: &TempDir) -> PathBuf {
    tmp.path().join("autosave").join("olivetti_state.json")
}

/// Store with the default three backups.
pub fn test_store(tmp: &TempDir) -> SnapshotStore {
    SnapshotStore::new(snapshot_path(tmp), 3).unwrap()
}

/// Fresh engine at the default 512 dimensions and default capacities.
pub fn test_engine(tmp: &TempDir) -> MemoryEngine {
    test_engine_with(tmp, 512, BankLimits::default())
}

/// Fresh engine with custom dimensions and capacities.
/// Small dimensions keep capacity tests fast: every ingest rewrites the snapshot.
pub fn test_engine_with(tmp: &TempDir, dimensions: usize, limits: BankLimits) -> MemoryEngine {
    let encoder = Box::new(HashingEncoder::new(dimensions).unwrap());
    MemoryEngine::new(encoder, test_store(tmp), limits)
}

/// Config whose snapshot lives in `tmp`.
pub fn test_config(tmp: &TempDir) -> OlivettiConfig {
    let mut config = OlivettiConfig::default();
    config.storage.snapshot_path = snapshot_path(tmp).to_string_lossy().into_owned();
    config
}

/// Open an engine the way the binary does, from config.
pub fn open_engine(config: &OlivettiConfig) -> MemoryEngine {
    MemoryEngine::open(config).unwrap()
}

/// Distinct sample texts: `"sample 0 ..."`, `"sample 1 ..."`, ...
pub fn numbered_text(i: usize) -> String {
    format!("sample {i} of the rain on the harbor")
}
