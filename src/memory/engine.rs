//! The memory engine façade.
//!
//! [`MemoryEngine`] owns the engine state (every bank plus the caller's opaque
//! payload), the encoder, and the snapshot store. Every mutating call is
//! write-through: the state is changed in memory, then checkpointed. If the
//! checkpoint fails the change is kept in memory and the
//! [`MemoryError::Persistence`] error is returned; [`MemoryEngine::save`]
//! retries it.
//!
//! The engine is single-writer. Hosts that share one across threads wrap it in
//! a `Mutex` so that insert + evict + checkpoint form one critical section.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::OlivettiConfig;
use crate::embedding::{self, VectorEncoder};
use crate::error::{MemoryError, MemoryResult};
use crate::memory::bank::SampleBank;
use crate::memory::search;
use crate::memory::stats::{self, EngineStats};
use crate::memory::types::{BankKey, BankKind, BankLimits, Exemplar, Lane, Sample};
use crate::storage::schema::{BankRecord, Snapshot, SNAPSHOT_VERSION};
use crate::storage::{SnapshotSlot, SnapshotStore};

/// Everything that gets checkpointed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineState {
    pub banks: BTreeMap<BankKey, SampleBank>,
    pub payload: serde_json::Value,
}

/// Result of a single ingest.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub bank: String,
    pub bank_size: usize,
    pub capacity: usize,
    /// `true` if the oldest sample was evicted to make room.
    pub evicted: bool,
}

pub struct MemoryEngine {
    state: EngineState,
    encoder: Box<dyn VectorEncoder>,
    store: SnapshotStore,
    limits: BankLimits,
    /// Slot the state was restored from, `None` for a fresh engine.
    restored_from: Option<SnapshotSlot>,
}

impl MemoryEngine {
    /// An empty engine. Nothing is written until the first mutation.
    pub fn new(encoder: Box<dyn VectorEncoder>, store: SnapshotStore, limits: BankLimits) -> Self {
        Self {
            state: EngineState::default(),
            encoder,
            store,
            limits,
            restored_from: None,
        }
    }

    /// Build the encoder and store from config and restore the latest snapshot.
    ///
    /// A chain with no files at all yields an empty engine. A chain whose files
    /// are all unreadable yields [`MemoryError::NoRecoverableState`]; the caller
    /// decides whether to start over.
    pub fn open(config: &OlivettiConfig) -> MemoryResult<Self> {
        config.validate()?;
        let encoder = embedding::create_encoder(&config.embedding)?;
        let store = SnapshotStore::new(config.resolved_snapshot_path(), config.storage.backup_count)?;
        let limits = BankLimits::from(&config.memory);

        let mut engine = Self::new(encoder, store, limits);
        if engine.store.has_snapshot() {
            engine.restore()?;
        } else {
            tracing::info!(
                path = %engine.store.path().display(),
                "no snapshot found, starting with empty memory"
            );
        }
        Ok(engine)
    }

    /// Replace the in-memory state with the newest snapshot that both parses and
    /// rebuilds into valid banks. Slots failing either step are skipped.
    pub fn restore(&mut self) -> MemoryResult<()> {
        let encoder_name = self.encoder.name().to_string();
        let encoder_dimensions = self.encoder.dimensions();
        let limits = self.limits;
        limits.validate()?;

        let ((state, stored_encoder, stored_dimensions), slot) = self.store.load_with(|snapshot| {
            let encoder = snapshot.encoder.clone();
            let dimensions = snapshot.dimensions;
            let state = state_from_snapshot(snapshot, &limits).map_err(|e| e.to_string())?;
            Ok((state, encoder, dimensions))
        })?;

        if stored_encoder != encoder_name || stored_dimensions != encoder_dimensions {
            tracing::warn!(
                stored_encoder = %stored_encoder,
                stored_dimensions,
                configured_encoder = %encoder_name,
                configured_dimensions = encoder_dimensions,
                "encoder changed, run `olivetti re-embed` to update all vectors"
            );
        }

        self.state = state;
        self.restored_from = Some(slot);
        tracing::info!(
            banks = self.state.banks.len(),
            slot = %slot,
            "memory restored"
        );
        Ok(())
    }

    /// Encode `text` and add it to the (kind, lane, identity) bank, creating the
    /// bank if needed, then checkpoint.
    pub fn ingest_sample(
        &mut self,
        lane: Lane,
        identity: &str,
        kind: BankKind,
        text: &str,
        description: Option<&str>,
    ) -> MemoryResult<IngestOutcome> {
        let key = BankKey::new(kind, lane, identity)?;
        if text.trim().is_empty() {
            return Err(MemoryError::invalid_sample("text must not be empty"));
        }

        let vector = self.encoder.encode(text);
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let sample = Sample::new(text, description, vector);

        let capacity = self.limits.capacity(kind);
        let dimensions = self.encoder.dimensions();
        let bank = match self.state.banks.entry(key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(SampleBank::new(capacity, dimensions)?),
        };

        let evicted = bank.insert(sample)?;
        let outcome = IngestOutcome {
            bank: key.to_string(),
            bank_size: bank.len(),
            capacity: bank.capacity(),
            evicted: evicted.is_some(),
        };

        if evicted.is_some() {
            tracing::debug!(bank = %key, capacity, "bank full, evicted oldest sample");
        }
        tracing::info!(
            bank = %key,
            size = outcome.bank_size,
            text_len = text.len(),
            "sample ingested"
        );

        self.save()?;
        Ok(outcome)
    }

    /// Rank the (kind, lane, identity) bank against `query` and return the top `k`.
    ///
    /// A bank that does not exist yields an empty list.
    pub fn retrieve_exemplars(
        &self,
        lane: Lane,
        identity: &str,
        kind: BankKind,
        query: &str,
        k: usize,
    ) -> Vec<Exemplar> {
        let Some(bank) = self.bank_for(kind, lane, identity) else {
            return Vec::new();
        };
        let query_vector = self.encoder.encode(query);
        search::top_k(&query_vector, bank.samples(), k)
            .iter()
            .map(|r| r.to_exemplar())
            .collect()
    }

    /// Remove an entire bank. Returns whether anything was removed; absent banks
    /// are not an error and cause no checkpoint.
    pub fn delete_identity(&mut self, lane: Lane, identity: &str, kind: BankKind) -> MemoryResult<bool> {
        let key = BankKey::new(kind, lane, identity)?;
        if self.state.banks.remove(&key).is_none() {
            return Ok(false);
        }
        tracing::info!(bank = %key, "bank deleted");
        self.save()?;
        Ok(true)
    }

    /// Identities with a bank in this lane and kind, sorted.
    pub fn list_identities(&self, lane: Lane, kind: BankKind) -> Vec<String> {
        self.state
            .banks
            .keys()
            .filter(|k| k.lane == lane && k.kind == kind)
            .map(|k| k.identity.clone())
            .collect()
    }

    /// Read access to one bank, for prompt assembly.
    pub fn bank(&self, key: &BankKey) -> Option<&SampleBank> {
        self.state.banks.get(key)
    }

    fn bank_for(&self, kind: BankKind, lane: Lane, identity: &str) -> Option<&SampleBank> {
        let key = BankKey::new(kind, lane, identity).ok()?;
        self.state.banks.get(&key)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.state.payload
    }

    /// Replace the caller-owned payload and checkpoint.
    pub fn set_payload(&mut self, payload: serde_json::Value) -> MemoryResult<()> {
        self.state.payload = payload;
        self.save()
    }

    /// Re-encode every stored sample with the current encoder, then checkpoint.
    /// Returns the number of samples re-encoded.
    pub fn reencode_all(&mut self) -> MemoryResult<usize> {
        let dimensions = self.encoder.dimensions();
        let encoder = &self.encoder;
        let mut total = 0;
        for bank in self.state.banks.values_mut() {
            let texts: Vec<&str> = bank.samples().map(|s| s.text.as_str()).collect();
            let vectors = encoder.encode_batch(&texts);
            total += vectors.len();
            bank.reencode(dimensions, vectors);
        }
        tracing::info!(samples = total, encoder = %self.encoder.name(), "re-encoded all samples");
        self.save()?;
        Ok(total)
    }

    /// Checkpoint the current state. Called after every mutation; also the
    /// shutdown and retry hook.
    pub fn save(&self) -> MemoryResult<()> {
        let snapshot = snapshot_from_state(&self.state, self.encoder.as_ref());
        self.store.save(&snapshot).inspect_err(|e| {
            tracing::error!(error = %e, "checkpoint failed; in-memory state kept");
        })
    }

    pub fn stats(&self) -> EngineStats {
        stats::engine_stats(&self.state, &self.store)
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn encoder(&self) -> &dyn VectorEncoder {
        self.encoder.as_ref()
    }

    pub fn restored_from(&self) -> Option<SnapshotSlot> {
        self.restored_from
    }
}

fn snapshot_from_state(state: &EngineState, encoder: &dyn VectorEncoder) -> Snapshot {
    let banks = state
        .banks
        .iter()
        .map(|(key, bank)| BankRecord {
            kind: key.kind,
            lane: key.lane,
            identity: key.identity.clone(),
            dimensions: bank.dimensions(),
            samples: bank.samples().cloned().collect(),
        })
        .collect();

    Snapshot {
        version: SNAPSHOT_VERSION,
        saved_at: chrono::Utc::now(),
        encoder: encoder.name().to_string(),
        dimensions: encoder.dimensions(),
        banks,
        payload: state.payload.clone(),
    }
}

fn state_from_snapshot(snapshot: Snapshot, limits: &BankLimits) -> MemoryResult<EngineState> {
    let mut banks = BTreeMap::new();
    for record in snapshot.banks {
        let key = BankKey::new(record.kind, record.lane, &record.identity)?;
        let bank = SampleBank::restore(limits.capacity(record.kind), record.dimensions, record.samples)?;
        banks.insert(key, bank);
    }
    Ok(EngineState {
        banks,
        payload: snapshot.payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::hashing::HashingEncoder;
    use tempfile::TempDir;

    fn engine_in(dir: &TempDir, limits: BankLimits) -> MemoryEngine {
        let store = SnapshotStore::new(dir.path().join("state.json"), 3).unwrap();
        MemoryEngine::new(Box::new(HashingEncoder::new(512).unwrap()), store, limits)
    }

    #[test]
    fn test_ingest_creates_bank_and_checkpoints() {
        let tmp = TempDir::new().unwrap();
        let mut engine = engine_in(&tmp, BankLimits::default());

        let outcome = engine
            .ingest_sample(Lane::Dialogue, "noir", BankKind::Style, "He said nothing.", None)
            .unwrap();
        assert_eq!(outcome.bank_size, 1);
        assert_eq!(outcome.capacity, 250);
        assert!(!outcome.evicted);
        assert!(engine.store().path().exists());
    }

    #[test]
    fn test_ingest_rejects_empty_text_without_creating_bank() {
        let tmp = TempDir::new().unwrap();
        let mut engine = engine_in(&tmp, BankLimits::default());
        let err = engine
            .ingest_sample(Lane::Action, "pulp", BankKind::Style, "   ", None)
            .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidSample { .. }));
        assert!(engine.list_identities(Lane::Action, BankKind::Style).is_empty());
        assert!(!engine.store().path().exists());
    }

    #[test]
    fn test_voice_bank_uses_voice_capacity() {
        let tmp = TempDir::new().unwrap();
        let limits = BankLimits {
            style_capacity: 5,
            voice_capacity: 2,
        };
        let mut engine = engine_in(&tmp, limits);
        for n in 0..4 {
            engine
                .ingest_sample(Lane::Narration, "Voice A", BankKind::Voice, &format!("line {n}"), None)
                .unwrap();
        }
        let key = BankKey::new(BankKind::Voice, Lane::Narration, "Voice A").unwrap();
        assert_eq!(engine.bank(&key).unwrap().len(), 2);
    }

    #[test]
    fn test_reencode_all_switches_dimensions() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("state.json"), 3).unwrap();
        let mut engine = MemoryEngine::new(
            Box::new(HashingEncoder::new(16).unwrap()),
            store.clone(),
            BankLimits::default(),
        );
        engine
            .ingest_sample(Lane::Dialogue, "noir", BankKind::Style, "He said nothing.", None)
            .unwrap();

        let mut wider = MemoryEngine::new(
            Box::new(HashingEncoder::new(64).unwrap()),
            store,
            BankLimits::default(),
        );
        wider.restore().unwrap();
        assert_eq!(wider.reencode_all().unwrap(), 1);

        let key = BankKey::new(BankKind::Style, Lane::Dialogue, "noir").unwrap();
        let bank = wider.bank(&key).unwrap();
        assert_eq!(bank.dimensions(), 64);
        assert_eq!(bank.samples().next().unwrap().vector.len(), 64);
    }
}
