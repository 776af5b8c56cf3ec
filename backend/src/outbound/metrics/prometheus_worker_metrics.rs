//! Prometheus adapter for stream worker (C3) message-disposition counters.

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{WorkerMetrics, WorkerMetricsError, WorkerOutcome};

fn outcome_label(outcome: WorkerOutcome) -> &'static str {
    match outcome {
        WorkerOutcome::Enriched => "enriched",
        WorkerOutcome::PoisonSkipped => "poison_skipped",
        WorkerOutcome::FailureCommitted => "failure_committed",
    }
}

/// Prometheus-backed recorder for [`WorkerMetrics`].
pub struct PrometheusWorkerMetrics {
    messages_total: CounterVec,
}

impl PrometheusWorkerMetrics {
    /// Create and register the counter with the provided registry.
    ///
    /// # Errors
    ///
    /// Returns an error when Prometheus rejects metric registration.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let messages_total = CounterVec::new(
            Opts::new(
                "stream_worker_messages_total",
                "Total stream worker messages by final disposition",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(messages_total.clone()))?;
        Ok(Self { messages_total })
    }
}

#[async_trait]
impl WorkerMetrics for PrometheusWorkerMetrics {
    async fn record_message(&self, outcome: WorkerOutcome) -> Result<(), WorkerMetricsError> {
        self.messages_total
            .with_label_values(&[outcome_label(outcome)])
            .inc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::enriched(WorkerOutcome::Enriched, "enriched")]
    #[case::poison(WorkerOutcome::PoisonSkipped, "poison_skipped")]
    #[case::failure(WorkerOutcome::FailureCommitted, "failure_committed")]
    #[tokio::test]
    async fn records_message_outcome(#[case] outcome: WorkerOutcome, #[case] label: &str) {
        let registry = Registry::new();
        let metrics =
            PrometheusWorkerMetrics::new(&registry).expect("metric registration should succeed");

        metrics
            .record_message(outcome)
            .await
            .expect("recording should not fail");

        let value = metrics.messages_total.with_label_values(&[label]).get();
        assert_eq!(value as u64, 1);
    }
}
