//! Prometheus adapter for vector matcher (C5) observability.

use async_trait::async_trait;
use prometheus::{Counter, Opts, Registry};

use crate::domain::ports::{MatcherMetrics, MatcherMetricsError};

/// Prometheus-backed recorder for [`MatcherMetrics`].
pub struct PrometheusMatcherMetrics {
    dimension_mismatches_total: Counter,
}

impl PrometheusMatcherMetrics {
    /// Create and register the counter with the provided registry.
    ///
    /// # Errors
    ///
    /// Returns an error when Prometheus rejects metric registration.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let dimension_mismatches_total = Counter::with_opts(Opts::new(
            "vector_matcher_dimension_mismatches_total",
            "Total candidates excluded from ranking for embedding dimensionality mismatch",
        ))?;
        registry.register(Box::new(dimension_mismatches_total.clone()))?;
        Ok(Self {
            dimension_mismatches_total,
        })
    }
}

#[async_trait]
impl MatcherMetrics for PrometheusMatcherMetrics {
    async fn record_dimension_mismatch(&self) -> Result<(), MatcherMetricsError> {
        self.dimension_mismatches_total.inc();
        Ok(())
    }
}
