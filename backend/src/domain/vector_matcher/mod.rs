//! Vector Matcher (C5): ranks persisted job embeddings against a query
//! vector under optional filters. See §4.5.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::domain::ports::{JobRepository, JobRepositoryError, MatcherMetrics};
use crate::domain::types::{CandidateMatch, MatchFilters, MatchResult};

pub struct VectorMatcher {
    repository: Arc<dyn JobRepository>,
    metrics: Arc<dyn MatcherMetrics>,
    embedding_dim: usize,
}

impl VectorMatcher {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        metrics: Arc<dyn MatcherMetrics>,
        embedding_dim: usize,
    ) -> Self {
        Self {
            repository,
            metrics,
            embedding_dim,
        }
    }

    /// Rank candidates against `query`, ordered by descending similarity.
    /// Candidates whose stored embedding length differs from the configured
    /// dimensionality are silently excluded and counted, never truncated or
    /// padded (§4.5 dimensionality invariant).
    pub async fn rank(
        &self,
        query: &[f32],
        limit: usize,
        min_similarity: f32,
        filters: &MatchFilters,
    ) -> Result<Vec<MatchResult>, JobRepositoryError> {
        let candidates = self.repository.query_candidates(filters).await?;
        let (results, mismatches) =
            rank_candidates(query, self.embedding_dim, candidates, limit, min_similarity);
        for _ in 0..mismatches {
            let _ = self.metrics.record_dimension_mismatch().await;
        }
        Ok(results)
    }
}

/// Pure ranking step, separated from I/O so the ordering and filtering
/// contract can be tested without a repository.
fn rank_candidates(
    query: &[f32],
    embedding_dim: usize,
    candidates: Vec<CandidateMatch>,
    limit: usize,
    min_similarity: f32,
) -> (Vec<MatchResult>, usize) {
    let mut mismatches = 0usize;
    let mut scored: Vec<(String, f32)> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if candidate.embedding.len() != embedding_dim || query.len() != embedding_dim {
            mismatches += 1;
            continue;
        }
        let sim = cosine_similarity(query, &candidate.embedding);
        if sim >= min_similarity {
            scored.push((candidate.id, sim));
        }
    }

    scored.sort_by(|a, b| match b.1.partial_cmp(&a.1) {
        Some(Ordering::Equal) | None => a.0.cmp(&b.0),
        Some(ordering) => ordering,
    });
    scored.truncate(limit);

    let results = scored
        .into_iter()
        .map(|(job_id, similarity)| MatchResult {
            job_id,
            similarity,
            gap: None,
        })
        .collect();

    (results, mismatches)
}

/// `dot(a, b) / (||a|| * ||b||)`, mapping either zero-norm vector to a
/// similarity of `0.0` rather than dividing by zero.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Seniority;

    fn candidate(id: &str, embedding: Vec<f32>) -> CandidateMatch {
        CandidateMatch {
            id: id.to_string(),
            embedding,
            seniority: Seniority::Mid,
            skills: vec![],
        }
    }

    #[test]
    fn ranks_by_descending_similarity() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            candidate("orthogonal", vec![0.0, 1.0]),
            candidate("identical", vec![1.0, 0.0]),
            candidate("opposite", vec![-1.0, 0.0]),
        ];
        let (results, mismatches) = rank_candidates(&query, 2, candidates, 10, -1.0);
        assert_eq!(mismatches, 0);
        assert_eq!(results[0].job_id, "identical");
        assert!(results[0].similarity > results[1].similarity);
    }

    #[test]
    fn exact_match_scores_one() {
        let query = vec![0.6, 0.8];
        let candidates = vec![candidate("self", vec![0.6, 0.8])];
        let (results, _) = rank_candidates(&query, 2, candidates, 10, 0.0);
        assert!((results[0].similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn excludes_dimension_mismatches_without_truncating() {
        let query = vec![1.0; 768];
        let candidates = vec![candidate("legacy", vec![0.1; 384])];
        let (results, mismatches) = rank_candidates(&query, 768, candidates, 10, 0.0);
        assert!(results.is_empty());
        assert_eq!(mismatches, 1);
    }

    #[test]
    fn zero_norm_candidate_scores_zero_not_nan() {
        let query = vec![1.0, 0.0];
        let candidates = vec![candidate("zero", vec![0.0, 0.0])];
        let (results, _) = rank_candidates(&query, 2, candidates, 10, -1.0);
        assert_eq!(results[0].similarity, 0.0);
    }

    #[test]
    fn ties_break_by_stable_id_order() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            candidate("b", vec![1.0, 0.0]),
            candidate("a", vec![1.0, 0.0]),
        ];
        let (results, _) = rank_candidates(&query, 2, candidates, 10, 0.0);
        assert_eq!(results[0].job_id, "a");
        assert_eq!(results[1].job_id, "b");
    }

    #[test]
    fn respects_limit_and_min_similarity() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            candidate("high", vec![1.0, 0.0]),
            candidate("mid", vec![0.8, 0.6]),
            candidate("low", vec![0.0, 1.0]),
        ];
        let (results, _) = rank_candidates(&query, 2, candidates, 1, 0.5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].job_id, "high");
    }
}
