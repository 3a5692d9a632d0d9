//! Core memory type definitions.
//!
//! Defines [`Lane`] (the four writing modes), [`BankKind`] (style bank or voice
//! vault), [`BankKey`] (the address of one bank), [`Sample`] (a stored exemplar
//! with its vector), and [`Exemplar`] (what retrieval hands back to callers).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// The four writing modes that partition style and voice memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Narration,
    Dialogue,
    Interiority,
    Action,
}

impl Lane {
    pub const ALL: [Lane; 4] = [
        Lane::Narration,
        Lane::Dialogue,
        Lane::Interiority,
        Lane::Action,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Narration => "narration",
            Self::Dialogue => "dialogue",
            Self::Interiority => "interiority",
            Self::Action => "action",
        }
    }

    /// Human-facing label, as shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Narration => "Narration",
            Self::Dialogue => "Dialogue",
            Self::Interiority => "Interiority",
            Self::Action => "Action",
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Lane {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "narration" => Ok(Self::Narration),
            "dialogue" => Ok(Self::Dialogue),
            "interiority" => Ok(Self::Interiority),
            "action" => Ok(Self::Action),
            _ => Err(MemoryError::UnknownLane(s.to_string())),
        }
    }
}

/// Which regime a bank belongs to. Determines its default capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankKind {
    /// Style bank: exemplars of a named prose style.
    Style,
    /// Voice vault: exemplars of a trained author voice.
    Voice,
}

impl BankKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Voice => "voice",
        }
    }
}

impl std::fmt::Display for BankKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BankKind {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "style" => Ok(Self::Style),
            "voice" => Ok(Self::Voice),
            _ => Err(MemoryError::UnknownKind(s.to_string())),
        }
    }
}

/// Per-kind bank capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankLimits {
    pub style_capacity: usize,
    pub voice_capacity: usize,
}

impl BankLimits {
    pub fn capacity(&self, kind: BankKind) -> usize {
        match kind {
            BankKind::Style => self.style_capacity,
            BankKind::Voice => self.voice_capacity,
        }
    }

    /// Both capacities must be positive.
    pub fn validate(&self) -> Result<(), MemoryError> {
        for kind in [BankKind::Style, BankKind::Voice] {
            if self.capacity(kind) == 0 {
                return Err(MemoryError::InvalidConfig(format!(
                    "{kind} capacity must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

impl Default for BankLimits {
    fn default() -> Self {
        Self {
            style_capacity: 250,
            voice_capacity: 60,
        }
    }
}

impl From<&crate::config::MemoryConfig> for BankLimits {
    fn from(config: &crate::config::MemoryConfig) -> Self {
        Self {
            style_capacity: config.style_capacity,
            voice_capacity: config.voice_capacity,
        }
    }
}

/// Address of one bank: kind × lane × identity.
///
/// Ordering is kind, then lane, then identity, which keeps snapshots and
/// listings stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BankKey {
    pub kind: BankKind,
    pub lane: Lane,
    pub identity: String,
}

impl BankKey {
    /// Build a key, trimming the identity. Empty identities are rejected.
    pub fn new(kind: BankKind, lane: Lane, identity: &str) -> Result<Self, MemoryError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(MemoryError::invalid_sample("identity must not be empty"));
        }
        Ok(Self {
            kind,
            lane,
            identity: identity.to_string(),
        })
    }
}

impl std::fmt::Display for BankKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.lane, self.identity)
    }
}

/// A stored writing sample. The vector is computed once at insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub vector: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl Sample {
    pub fn new(text: impl Into<String>, description: Option<String>, vector: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            description,
            vector,
            created_at: Utc::now(),
        }
    }
}

/// A retrieved exemplar. Vectors never leave the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exemplar {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cosine similarity to the query, in `[-1.0, 1.0]` (hashing vectors are non-negative).
    pub score: f32,
}
