//! Port for the best-effort cache the stream worker writes through to.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::types::EnrichedJob;

use super::define_port_error;

define_port_error!(
    pub enum JobCacheError {
        #[error("cache unavailable: {message}")]
        Unavailable { message: String },
    }
);

/// Write-through cache for freshly enriched jobs. Failures here are logged
/// by the caller and never block a log commit.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobCache: Send + Sync {
    async fn cache_job(
        &self,
        id: &str,
        job: &EnrichedJob,
        ttl: Duration,
    ) -> Result<(), JobCacheError>;
}

/// No-op cache used where the `metrics`/cache adapter is not configured.
pub struct NoOpJobCache;

#[async_trait]
impl JobCache for NoOpJobCache {
    async fn cache_job(
        &self,
        _id: &str,
        _job: &EnrichedJob,
        _ttl: Duration,
    ) -> Result<(), JobCacheError> {
        Ok(())
    }
}
