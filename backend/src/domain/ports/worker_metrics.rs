//! Port for stream worker (C3) observability.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::define_port_error;

define_port_error!(
    pub enum WorkerMetricsError {
        #[error("metrics export failed: {message}")]
        Export { message: String },
    }
);

/// Final disposition of one polled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    Enriched,
    PoisonSkipped,
    FailureCommitted,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkerMetrics: Send + Sync {
    async fn record_message(&self, outcome: WorkerOutcome) -> Result<(), WorkerMetricsError>;
}

pub struct NoOpWorkerMetrics;

#[async_trait]
impl WorkerMetrics for NoOpWorkerMetrics {
    async fn record_message(&self, _outcome: WorkerOutcome) -> Result<(), WorkerMetricsError> {
        Ok(())
    }
}
