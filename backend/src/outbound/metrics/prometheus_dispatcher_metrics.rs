//! Prometheus adapter for credential-dispatch outcome counters.

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{DispatchOutcome, DispatcherMetrics, DispatcherMetricsError};
use crate::domain::types::SlotIndex;

fn outcome_label(outcome: DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Success => "success",
        DispatchOutcome::RateLimited => "rate_limited",
        DispatchOutcome::Exhausted => "exhausted",
        DispatchOutcome::Transport => "transport",
        DispatchOutcome::Parse => "parse",
    }
}

/// Prometheus-backed recorder for [`DispatcherMetrics`].
pub struct PrometheusDispatcherMetrics {
    attempts_total: CounterVec,
    cooldowns_total: CounterVec,
}

impl PrometheusDispatcherMetrics {
    /// Create and register counters with the provided registry.
    ///
    /// # Errors
    ///
    /// Returns an error when Prometheus rejects metric registration.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let attempts_total = CounterVec::new(
            Opts::new(
                "dispatcher_attempts_total",
                "Total LLM dispatch attempts by credential slot and outcome",
            ),
            &["slot", "outcome"],
        )?;
        let cooldowns_total = CounterVec::new(
            Opts::new(
                "dispatcher_cooldowns_total",
                "Total times a credential slot entered cooldown after a rate limit",
            ),
            &["slot"],
        )?;
        registry.register(Box::new(attempts_total.clone()))?;
        registry.register(Box::new(cooldowns_total.clone()))?;
        Ok(Self {
            attempts_total,
            cooldowns_total,
        })
    }
}

#[async_trait]
impl DispatcherMetrics for PrometheusDispatcherMetrics {
    async fn record_attempt(
        &self,
        slot: SlotIndex,
        outcome: DispatchOutcome,
    ) -> Result<(), DispatcherMetricsError> {
        self.attempts_total
            .with_label_values(&[&slot.to_string(), outcome_label(outcome)])
            .inc();
        Ok(())
    }

    async fn record_cooldown(&self, slot: SlotIndex) -> Result<(), DispatcherMetricsError> {
        self.cooldowns_total
            .with_label_values(&[&slot.to_string()])
            .inc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn make_metrics() -> (Registry, PrometheusDispatcherMetrics) {
        let registry = Registry::new();
        let metrics = PrometheusDispatcherMetrics::new(&registry)
            .expect("metric registration should succeed");
        (registry, metrics)
    }

    #[rstest]
    #[tokio::test]
    async fn records_attempt_by_slot_and_outcome() {
        let (_registry, metrics) = make_metrics();
        metrics
            .record_attempt(SlotIndex(0), DispatchOutcome::RateLimited)
            .await
            .expect("recording should not fail");

        let value = metrics
            .attempts_total
            .with_label_values(&["slot-0", "rate_limited"])
            .get();
        assert_eq!(value as u64, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn records_cooldown_per_slot() {
        let (_registry, metrics) = make_metrics();
        metrics
            .record_cooldown(SlotIndex(1))
            .await
            .expect("recording should not fail");

        let value = metrics.cooldowns_total.with_label_values(&["slot-1"]).get();
        assert_eq!(value as u64, 1);
    }
}
