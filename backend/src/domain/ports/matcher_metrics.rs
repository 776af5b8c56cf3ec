//! Port for vector matcher (C5) observability, notably the dimensionality
//! mismatch counter required by §4.5.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::define_port_error;

define_port_error!(
    pub enum MatcherMetricsError {
        #[error("metrics export failed: {message}")]
        Export { message: String },
    }
);

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MatcherMetrics: Send + Sync {
    /// Record that a candidate was excluded from ranking because its stored
    /// embedding length did not match the configured dimensionality.
    async fn record_dimension_mismatch(&self) -> Result<(), MatcherMetricsError>;
}

pub struct NoOpMatcherMetrics;

#[async_trait]
impl MatcherMetrics for NoOpMatcherMetrics {
    async fn record_dimension_mismatch(&self) -> Result<(), MatcherMetricsError> {
        Ok(())
    }
}
