//! Port for the storage collaborator that owns persisted `EnrichedJob`s.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::types::{CandidateMatch, EnrichedJob, MatchFilters};

use super::define_port_error;

define_port_error!(
    pub enum JobRepositoryError {
        #[error("connection failed: {message}")]
        Connection { message: String },
        #[error("write failed: {message}")]
        Write { message: String },
        #[error("query failed: {message}")]
        Query { message: String },
    }
);

/// Storage consumed by the stream worker (upsert) and the vector matcher
/// (candidate query). Upserts are keyed by `EnrichedJob::id`; redelivery of
/// the same id is last-writer-wins.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert or replace the stored row for `job.id`.
    async fn upsert(&self, job: EnrichedJob) -> Result<(), JobRepositoryError>;

    /// Look up a single previously stored job, used to decide whether to
    /// preserve `created_at` on re-enrichment.
    async fn find(&self, id: &str) -> Result<Option<EnrichedJob>, JobRepositoryError>;

    /// Candidate rows for ranking, narrowed by `filters`. Callers apply the
    /// `limit` after similarity scoring, so this may return more than the
    /// eventual result size.
    async fn query_candidates(
        &self,
        filters: &MatchFilters,
    ) -> Result<Vec<CandidateMatch>, JobRepositoryError>;
}
