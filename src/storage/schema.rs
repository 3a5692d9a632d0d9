//! On-disk snapshot format.
//!
//! A snapshot is one JSON document holding every bank plus the caller's opaque
//! payload. [`SNAPSHOT_VERSION`] is bumped whenever the layout changes; a
//! binary refuses snapshots newer than it understands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::memory::types::{BankKind, Lane, Sample};

/// The snapshot format version that the current binary writes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Full persisted engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    /// Name of the encoder that wrote this snapshot.
    pub encoder: String,
    /// Output dimensions of that encoder. Individual banks record their own.
    pub dimensions: usize,
    #[serde(default)]
    pub banks: Vec<BankRecord>,
    /// Caller-owned state (projects, bays, settings), stored verbatim.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// One bank's samples, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    pub kind: BankKind,
    pub lane: Lane,
    pub identity: String,
    /// Vector length of every sample in this bank.
    pub dimensions: usize,
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl Snapshot {
    /// An empty snapshot stamped with the current time.
    pub fn empty(encoder: &str, dimensions: usize) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            encoder: encoder.to_string(),
            dimensions,
            banks: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.banks.iter().map(|b| b.samples.len()).sum()
    }

    /// Parse and version-check a snapshot document.
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let snapshot: Snapshot =
            serde_json::from_str(contents).map_err(|e| format!("parse error: {e}"))?;
        if snapshot.version == 0 || snapshot.version > SNAPSHOT_VERSION {
            return Err(format!(
                "unsupported snapshot version {} (this build reads up to {SNAPSHOT_VERSION})",
                snapshot.version
            ));
        }
        Ok(snapshot)
    }
}
