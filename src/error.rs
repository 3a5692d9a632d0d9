//! Error taxonomy for the memory engine.
//!
//! Every fallible library operation returns [`MemoryError`]. Input errors
//! (`InvalidSample`, `UnknownLane`, `UnknownKind`) are rejected before any state
//! changes. `Persistence` means the in-memory mutation stands but was not
//! checkpointed; `NoRecoverableState` means neither the primary snapshot nor any
//! backup could be read.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the library.
pub type MemoryResult<T> = Result<T, MemoryError>;

#[derive(Debug, Error)]
pub enum MemoryError {
    /// Empty text or identity, or a vector whose length does not match the bank.
    #[error("invalid sample: {reason}")]
    InvalidSample { reason: String },

    #[error("unknown lane: {0} (expected narration, dialogue, interiority, or action)")]
    UnknownLane(String),

    #[error("unknown bank kind: {0} (expected style or voice)")]
    UnknownKind(String),

    /// A checkpoint could not be written. The mutation that triggered it is
    /// kept in memory, not rolled back, and the save may be retried.
    #[error("failed to persist snapshot at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "no recoverable snapshot at {} (primary and {backups} backup(s) missing or corrupt)",
        path.display()
    )]
    NoRecoverableState { path: PathBuf, backups: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MemoryError {
    pub(crate) fn invalid_sample(reason: impl Into<String>) -> Self {
        Self::InvalidSample {
            reason: reason.into(),
        }
    }

    pub(crate) fn persistence(path: &Path, source: impl Into<std::io::Error>) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}
