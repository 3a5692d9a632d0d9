//! Text-to-vector encoding pipeline.
//!
//! Provides the [`VectorEncoder`] trait and a feature-hashing implementation
//! ([`hashing::HashingEncoder`]) that needs no model files and no network. The
//! encoder is created via [`create_encoder`] from configuration.

pub mod hashing;

use crate::config::EmbeddingConfig;
use crate::error::{MemoryError, MemoryResult};

/// Default vector dimensionality for the hashing encoder.
pub const DEFAULT_DIMENSIONS: usize = 512;

/// Trait for encoding text into fixed-length vectors.
///
/// Implementations are pure: the same text always yields the same vector, and
/// every vector has exactly [`dimensions`](VectorEncoder::dimensions) entries.
/// Non-empty vectors are L2-normalized; text with no tokens encodes to the zero
/// vector, which callers treat as "no signal".
pub trait VectorEncoder: Send + Sync {
    /// Encode a single text string into a vector.
    fn encode(&self, text: &str) -> Vec<f32>;

    /// Encode several texts. Implementations may override for batching.
    fn encode_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.encode(t)).collect()
    }

    /// Number of dimensions this encoder produces.
    fn dimensions(&self) -> usize;

    /// Stable identifier recorded in snapshots so a changed encoder can be detected.
    fn name(&self) -> &str;
}

/// Create an encoder from config.
///
/// Currently only `"hashing"` is supported.
pub fn create_encoder(config: &EmbeddingConfig) -> MemoryResult<Box<dyn VectorEncoder>> {
    match config.provider.as_str() {
        "hashing" => {
            let encoder = hashing::HashingEncoder::new(config.dimensions)?;
            Ok(Box::new(encoder))
        }
        other => Err(MemoryError::InvalidConfig(format!(
            "unknown embedding provider: {other}. Supported: hashing"
        ))),
    }
}

/// L2-normalize a vector in place. A zero vector is left unchanged.
pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}
