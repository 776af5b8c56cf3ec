//! Domain ports for the hexagonal boundary between the core components and
//! their infrastructure collaborators.

mod macros;
pub(crate) use macros::define_port_error;

mod dispatcher_metrics;
mod job_cache;
mod job_log;
mod job_repository;
mod llm_client;
mod matcher_metrics;
mod worker_metrics;

pub use dispatcher_metrics::{
    DispatchOutcome, DispatcherMetrics, DispatcherMetricsError, NoOpDispatcherMetrics,
};
#[cfg(test)]
pub use job_cache::MockJobCache;
pub use job_cache::{JobCache, JobCacheError, NoOpJobCache};
#[cfg(test)]
pub use job_log::MockJobLog;
pub use job_log::{JobLog, JobLogError, LogOffset, RawLogMessage};
#[cfg(test)]
pub use job_repository::MockJobRepository;
pub use job_repository::{JobRepository, JobRepositoryError};
#[cfg(test)]
pub use llm_client::MockLlmClient;
pub use llm_client::{GenerationParams, LlmClient, LlmClientError};
pub use matcher_metrics::{MatcherMetrics, MatcherMetricsError, NoOpMatcherMetrics};
pub use worker_metrics::{NoOpWorkerMetrics, WorkerMetrics, WorkerMetricsError, WorkerOutcome};

#[cfg(test)]
pub use dispatcher_metrics::MockDispatcherMetrics;
#[cfg(test)]
pub use matcher_metrics::MockMatcherMetrics;
#[cfg(test)]
pub use worker_metrics::MockWorkerMetrics;
