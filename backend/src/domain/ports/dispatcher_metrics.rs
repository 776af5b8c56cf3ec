//! Port for dispatcher (C1) observability: call outcomes and retry/cooldown
//! behavior, all labeled only by slot index, never by credential.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::types::SlotIndex;

use super::define_port_error;

define_port_error!(
    pub enum DispatcherMetricsError {
        #[error("metrics export failed: {message}")]
        Export { message: String },
    }
);

/// Outcome of a single dispatch attempt, reported once classification (§4.1
/// step 4) completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success,
    RateLimited,
    Exhausted,
    Transport,
    Parse,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DispatcherMetrics: Send + Sync {
    /// Record the outcome of one attempt against `slot`.
    async fn record_attempt(
        &self,
        slot: SlotIndex,
        outcome: DispatchOutcome,
    ) -> Result<(), DispatcherMetricsError>;

    /// Record that `slot` entered cooling after a rate-limit signal.
    async fn record_cooldown(&self, slot: SlotIndex) -> Result<(), DispatcherMetricsError>;
}

pub struct NoOpDispatcherMetrics;

#[async_trait]
impl DispatcherMetrics for NoOpDispatcherMetrics {
    async fn record_attempt(
        &self,
        _slot: SlotIndex,
        _outcome: DispatchOutcome,
    ) -> Result<(), DispatcherMetricsError> {
        Ok(())
    }

    async fn record_cooldown(&self, _slot: SlotIndex) -> Result<(), DispatcherMetricsError> {
        Ok(())
    }
}
