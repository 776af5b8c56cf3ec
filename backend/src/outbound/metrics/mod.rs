//! Outbound adapters for metrics exporting.
//!
//! This module provides Prometheus-backed implementations of domain metrics
//! ports. All adapters here are compiled only when the `metrics` feature is
//! enabled.

mod prometheus_dispatcher_metrics;
mod prometheus_matcher_metrics;
mod prometheus_worker_metrics;

pub use prometheus_dispatcher_metrics::PrometheusDispatcherMetrics;
pub use prometheus_matcher_metrics::PrometheusMatcherMetrics;
pub use prometheus_worker_metrics::PrometheusWorkerMetrics;
