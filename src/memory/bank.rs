//! Capacity-bounded FIFO sample bank.
//!
//! A [`SampleBank`] holds the samples for one (kind, lane, identity) key in
//! insertion order. Inserting into a full bank evicts the oldest sample first,
//! so `len() <= capacity()` holds after every insert.

use std::collections::VecDeque;

use crate::error::{MemoryError, MemoryResult};
use crate::memory::types::Sample;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBank {
    capacity: usize,
    dimensions: usize,
    samples: VecDeque<Sample>,
}

impl SampleBank {
    /// An empty bank. A zero capacity could never hold a sample and is rejected.
    pub fn new(capacity: usize, dimensions: usize) -> MemoryResult<Self> {
        if capacity == 0 {
            return Err(MemoryError::InvalidConfig(
                "bank capacity must be greater than zero".into(),
            ));
        }
        Ok(Self {
            capacity,
            dimensions,
            samples: VecDeque::new(),
        })
    }

    /// Rebuild a bank from persisted samples (oldest first).
    ///
    /// If there are more samples than `capacity` (the limit was lowered since the
    /// snapshot was written), the oldest are dropped.
    pub fn restore(capacity: usize, dimensions: usize, samples: Vec<Sample>) -> MemoryResult<Self> {
        let mut bank = Self::new(capacity, dimensions)?;
        for sample in &samples {
            bank.validate(sample)?;
        }
        let overflow = samples.len().saturating_sub(capacity);
        if overflow > 0 {
            tracing::warn!(
                dropped = overflow,
                capacity,
                "snapshot bank exceeds capacity, dropping oldest samples"
            );
        }
        bank.samples = samples.into_iter().skip(overflow).collect();
        Ok(bank)
    }

    fn validate(&self, sample: &Sample) -> MemoryResult<()> {
        if sample.text.trim().is_empty() {
            return Err(MemoryError::invalid_sample("text must not be empty"));
        }
        if sample.vector.len() != self.dimensions {
            return Err(MemoryError::invalid_sample(format!(
                "vector has {} dimensions, bank expects {}",
                sample.vector.len(),
                self.dimensions
            )));
        }
        Ok(())
    }

    /// Insert a sample, evicting the oldest one if the bank is full.
    ///
    /// Returns the evicted sample, if any. Invalid samples are rejected before
    /// anything is evicted.
    pub fn insert(&mut self, sample: Sample) -> MemoryResult<Option<Sample>> {
        self.validate(&sample)?;
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        Ok(evicted)
    }

    /// Samples in insertion order, oldest first.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Swap in freshly encoded vectors (one per sample, oldest first) and switch
    /// the bank to `dimensions`.
    pub(crate) fn reencode(&mut self, dimensions: usize, vectors: Vec<Vec<f32>>) {
        debug_assert_eq!(vectors.len(), self.samples.len());
        self.dimensions = dimensions;
        for (sample, vector) in self.samples.iter_mut().zip(vectors) {
            sample.vector = vector;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Sample {
        Sample::new(format!("sample {n}"), None, vec![1.0, 0.0])
    }

    #[test]
    fn test_insert_under_capacity() {
        let mut bank = SampleBank::new(3, 2).unwrap();
        assert!(bank.insert(sample(1)).unwrap().is_none());
        assert!(bank.insert(sample(2)).unwrap().is_none());
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn test_fifo_eviction() {
        let capacity = 5;
        let mut bank = SampleBank::new(capacity, 2).unwrap();
        for n in 1..=capacity + 1 {
            bank.insert(sample(n)).unwrap();
        }
        assert_eq!(bank.len(), capacity);
        let texts: Vec<&str> = bank.samples().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["sample 2", "sample 3", "sample 4", "sample 5", "sample 6"]
        );
    }

    #[test]
    fn test_eviction_returns_oldest() {
        let mut bank = SampleBank::new(1, 2).unwrap();
        bank.insert(sample(1)).unwrap();
        let evicted = bank.insert(sample(2)).unwrap();
        assert_eq!(evicted.unwrap().text, "sample 1");
    }

    #[test]
    fn test_rejects_empty_text() {
        let mut bank = SampleBank::new(2, 2).unwrap();
        let err = bank
            .insert(Sample::new("  ", None, vec![0.0, 0.0]))
            .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidSample { .. }));
        assert!(bank.is_empty());
    }

    #[test]
    fn test_rejects_dimension_mismatch_without_evicting() {
        let mut bank = SampleBank::new(1, 2).unwrap();
        bank.insert(sample(1)).unwrap();
        let err = bank
            .insert(Sample::new("wrong", None, vec![1.0, 0.0, 0.0]))
            .unwrap_err();
        assert!(err.to_string().contains("3 dimensions"));
        // Full bank must be untouched by a rejected insert.
        assert_eq!(bank.samples().next().unwrap().text, "sample 1");
    }

    #[test]
    fn test_restore_truncates_oldest() {
        let samples: Vec<Sample> = (1..=4).map(sample).collect();
        let bank = SampleBank::restore(2, 2, samples).unwrap();
        let texts: Vec<&str> = bank.samples().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["sample 3", "sample 4"]);
    }

    #[test]
    fn test_zero_capacity_is_invalid_config() {
        assert!(matches!(
            SampleBank::new(0, 2),
            Err(MemoryError::InvalidConfig(_))
        ));
        assert!(matches!(
            SampleBank::restore(0, 2, vec![sample(1)]),
            Err(MemoryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_restore_rejects_bad_vectors() {
        let samples = vec![Sample::new("x", None, vec![1.0])];
        assert!(SampleBank::restore(2, 2, samples).is_err());
    }
}
