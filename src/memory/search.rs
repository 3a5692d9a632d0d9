use crate::memory::types::{Exemplar, Sample};

// ── Public types ──────────────────────────────────────────────────────────────

/// One ranked candidate. `position` is the candidate's insertion index.
#[derive(Debug, Clone, Copy)]
pub struct Ranked<'a> {
    pub sample: &'a Sample,
    pub score: f32,
    pub position: usize,
}

impl Ranked<'_> {
    pub fn to_exemplar(&self) -> Exemplar {
        Exemplar {
            text: self.sample.text.clone(),
            description: self.sample.description.clone(),
            score: self.score,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ, so the
/// result is never NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Rank `candidates` (in insertion order) against `query` and keep the best `k`.
///
/// Higher similarity first; equal scores keep insertion order. Returns an
/// empty vector for `k == 0` or no candidates, and every candidate when `k`
/// exceeds their number.
pub fn top_k<'a, I>(query: &[f32], candidates: I, k: usize) -> Vec<Ranked<'a>>
where
    I: IntoIterator<Item = &'a Sample>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<Ranked<'a>> = candidates
        .into_iter()
        .enumerate()
        .map(|(position, sample)| Ranked {
            sample,
            score: cosine_similarity(query, &sample.vector),
            position,
        })
        .collect();

    // Stable sort: ties stay in insertion order.
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(v: &[f32]) -> Vec<f32> {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / norm).collect()
    }

    fn sample(text: &str, vector: Vec<f32>) -> Sample {
        Sample::new(text, None, vector)
    }

    #[test]
    fn test_top_k_prefers_nearest() {
        let samples = vec![
            sample("first", normalized(&[1.0, 0.0])),
            sample("second", normalized(&[0.0, 1.0])),
            sample("third", normalized(&[0.9, 0.1])),
        ];
        let ranked = top_k(&[1.0, 0.0], &samples, 2);
        let texts: Vec<&str> = ranked.iter().map(|r| r.sample.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "third"]);
        assert!((ranked[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let samples = vec![
            sample("a", vec![1.0, 0.0]),
            sample("b", vec![0.0, 1.0]),
            sample("c", vec![1.0, 0.0]),
            sample("d", vec![0.0, 1.0]),
        ];
        let ranked = top_k(&[1.0, 0.0], &samples, 4);
        let order: Vec<usize> = ranked.iter().map(|r| r.position).collect();
        assert_eq!(order, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_empty_candidates_and_zero_k() {
        let empty: Vec<Sample> = Vec::new();
        assert!(top_k(&[1.0, 0.0], &empty, 3).is_empty());

        let samples = vec![sample("a", vec![1.0, 0.0])];
        assert!(top_k(&[1.0, 0.0], &samples, 0).is_empty());
    }

    #[test]
    fn test_k_larger_than_candidates_returns_all() {
        let samples = vec![sample("a", vec![0.0, 1.0]), sample("b", vec![1.0, 0.0])];
        let ranked = top_k(&[1.0, 0.0], &samples, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].sample.text, "b");
    }

    #[test]
    fn test_zero_vector_similarity_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
        assert!(!cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]).is_nan());
    }

    #[test]
    fn test_length_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_handles_unnormalized_input() {
        let sim = cosine_similarity(&[2.0, 0.0], &[3.0, 3.0]);
        assert!((sim - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_to_exemplar_hides_vector() {
        let s = Sample::new("text", Some("desc".into()), vec![1.0]);
        let ranked = top_k(&[1.0], std::iter::once(&s), 1);
        let ex = ranked[0].to_exemplar();
        assert_eq!(ex.text, "text");
        assert_eq!(ex.description.as_deref(), Some("desc"));
    }
}
