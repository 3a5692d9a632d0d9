//! Feature-hashing encoder.
//!
//! Lowercases the text, splits it into Unicode word tokens, and hashes each
//! token into one of `D` buckets (SHA-256, first four bytes, modulo `D`). Bucket
//! counts are L2-normalized. Collisions are part of the scheme: two tokens that
//! land in the same bucket are indistinguishable.

use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use super::{l2_normalize, VectorEncoder};
use crate::error::{MemoryError, MemoryResult};

const ENCODER_NAME: &str = "hashing-sha256";

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\w+").expect("static word regex is valid"))
}

/// Bag-of-words encoder over hashed token buckets.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimensions: usize,
}

impl HashingEncoder {
    pub fn new(dimensions: usize) -> MemoryResult<Self> {
        if dimensions == 0 {
            return Err(MemoryError::InvalidConfig(
                "encoder dimensions must be greater than zero".into(),
            ));
        }
        Ok(Self { dimensions })
    }

    /// Bucket index for a single (already lowercased) token.
    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let prefix = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        prefix as usize % self.dimensions
    }
}

/// Lowercase and split into word tokens. Punctuation and whitespace are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    word_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

impl VectorEncoder for HashingEncoder {
    fn encode(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            vector[self.bucket(&token)] += 1.0;
        }
        l2_normalize(&mut vector);
        vector
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        ENCODER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = HashingEncoder::new(512).unwrap();
        let a = encoder.encode("The rain fell on the tin roof.");
        let b = encoder.encode("The rain fell on the tin roof.");
        assert_eq!(a, b, "same input must produce bit-identical output");

        // A second encoder instance must agree too.
        let other = HashingEncoder::new(512).unwrap();
        assert_eq!(a, other.encode("The rain fell on the tin roof."));
    }

    #[test]
    fn test_encode_is_unit_norm() {
        let encoder = HashingEncoder::new(512).unwrap();
        for text in ["He said nothing.", "a", "Über café naïve — 123"] {
            let v = encoder.encode(text);
            assert_eq!(v.len(), 512);
            assert!((norm(&v) - 1.0).abs() < 1e-5, "norm of {text:?} was {}", norm(&v));
        }
    }

    #[test]
    fn test_empty_and_punctuation_encode_to_zero() {
        let encoder = HashingEncoder::new(512).unwrap();
        for text in ["", "   \n\t", "?!... --- ,,,"] {
            let v = encoder.encode(text);
            assert_eq!(v.len(), 512);
            assert!(v.iter().all(|x| *x == 0.0), "{text:?} should encode to zero");
        }
    }

    #[test]
    fn test_case_and_punctuation_are_ignored() {
        let encoder = HashingEncoder::new(512).unwrap();
        assert_eq!(encoder.encode("Quiet, please!"), encoder.encode("quiet please"));
    }

    #[test]
    fn test_repeated_token_counts_accumulate() {
        // With one bucket everything collides; normalization still yields 1.0.
        let encoder = HashingEncoder::new(1).unwrap();
        assert_eq!(encoder.encode("go go go"), vec![1.0]);
    }

    #[test]
    fn test_single_token_hits_one_bucket() {
        let encoder = HashingEncoder::new(512).unwrap();
        let v = encoder.encode("lantern");
        let nonzero: Vec<_> = v.iter().filter(|x| **x != 0.0).collect();
        assert_eq!(nonzero.len(), 1);
        assert_eq!(*nonzero[0], 1.0);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("He said: \"Nothing.\""),
            vec!["he", "said", "nothing"]
        );
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(HashingEncoder::new(0).is_err());
    }
}
