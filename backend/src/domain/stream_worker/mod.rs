//! Stream Worker (C3): drives the enrichment transform from a durable,
//! partitioned message log. See §4.3.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::domain::enrichment::EnrichmentTransform;
use crate::domain::llm_dispatcher::{DispatchError, DispatchSleeper};
use crate::domain::ports::{
    JobCache, JobLog, JobRepository, LogOffset, RawLogMessage, WorkerMetrics, WorkerOutcome,
};
use crate::domain::types::RawJob;

#[derive(Debug, Clone, Copy)]
pub struct StreamWorkerConfig {
    pub poll_timeout: Duration,
    pub max_transport_retries: usize,
    pub retry_backoff: Duration,
    pub cache_ttl: Duration,
}

impl Default for StreamWorkerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(5),
            max_transport_retries: 3,
            retry_backoff: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

pub struct StreamWorker {
    job_log: Arc<dyn JobLog>,
    enrichment: Arc<EnrichmentTransform>,
    repository: Arc<dyn JobRepository>,
    cache: Arc<dyn JobCache>,
    metrics: Arc<dyn WorkerMetrics>,
    sleeper: Arc<dyn DispatchSleeper>,
    config: StreamWorkerConfig,
}

impl StreamWorker {
    pub fn new(
        job_log: Arc<dyn JobLog>,
        enrichment: Arc<EnrichmentTransform>,
        repository: Arc<dyn JobRepository>,
        cache: Arc<dyn JobCache>,
        metrics: Arc<dyn WorkerMetrics>,
        sleeper: Arc<dyn DispatchSleeper>,
        config: StreamWorkerConfig,
    ) -> Self {
        Self {
            job_log,
            enrichment,
            repository,
            cache,
            metrics,
            sleeper,
            config,
        }
    }

    /// Poll and process messages until the process is stopped (the log
    /// collaborator's timeout bounds each idle iteration). Intended to run
    /// as the body of a dedicated worker task; horizontal replicas each run
    /// their own instance under a distinct consumer-group identity.
    pub async fn run(&self) {
        loop {
            match self.job_log.poll(self.config.poll_timeout).await {
                Ok(Some(message)) => self.process_message(message).await,
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "job log poll failed; backing off");
                    self.sleeper.sleep(self.config.retry_backoff).await;
                }
            }
        }
    }

    /// Handle exactly one polled message through decode, enrichment, and
    /// commit (§4.3 steps 2–6).
    async fn process_message(&self, message: RawLogMessage) {
        let raw: RawJob = match serde_json::from_slice(&message.payload) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "dropping undecodable message (poison)");
                self.commit(message.offset).await;
                self.record(WorkerOutcome::PoisonSkipped).await;
                return;
            }
        };

        let mut transport_attempts = 0usize;
        let mut parse_attempts = 0usize;

        loop {
            match self.enrichment.enrich(raw.clone()).await {
                Ok(enriched) => {
                    let enriched = self.preserve_created_at(enriched).await;
                    if !self.upsert_with_retry(&enriched, message.offset.clone()).await {
                        return;
                    }
                    if let Err(err) = self
                        .cache
                        .cache_job(&enriched.id, &enriched, self.config.cache_ttl)
                        .await
                    {
                        warn!(error = %err, job_id = %enriched.id, "best-effort cache write failed");
                    }
                    self.commit(message.offset).await;
                    self.record(WorkerOutcome::Enriched).await;
                    return;
                }
                Err(DispatchError::Exhausted { .. }) => {
                    // Do not commit; redelivery on restart is acceptable,
                    // but we stay on this message and retry in place.
                    self.sleeper.sleep(self.config.retry_backoff).await;
                }
                Err(DispatchError::Transport { message: detail }) => {
                    transport_attempts += 1;
                    if transport_attempts > self.config.max_transport_retries {
                        warn!(job_id = %raw.id, error = %detail, "transport retries exhausted; committing with logged failure");
                        self.commit(message.offset).await;
                        self.record(WorkerOutcome::FailureCommitted).await;
                        return;
                    }
                    self.sleeper.sleep(self.config.retry_backoff).await;
                }
                Err(DispatchError::Parse { message: detail }) => {
                    parse_attempts += 1;
                    if parse_attempts > 1 {
                        warn!(job_id = %raw.id, error = %detail, "poison after retry: LLM output never matched the expected shape");
                        self.commit(message.offset).await;
                        self.record(WorkerOutcome::PoisonSkipped).await;
                        return;
                    }
                }
            }
        }
    }

    /// Upsert `enriched`, retrying on `StorageError` up to
    /// `max_transport_retries` times with `retry_backoff` between attempts
    /// (the same budget as transport errors from the dispatcher). Never
    /// commits on failure: either the upsert eventually succeeds (returns
    /// `true`) or the retry budget is exhausted and the message is
    /// committed with a logged failure (returns `false`), matching §8
    /// invariant 3 — the log position only advances once an `EnrichedJob`
    /// is actually stored, or the message has been explicitly marked
    /// poison/failed.
    async fn upsert_with_retry(
        &self,
        enriched: &crate::domain::types::EnrichedJob,
        offset: LogOffset,
    ) -> bool {
        let mut storage_attempts = 0usize;
        loop {
            match self.repository.upsert(enriched.clone()).await {
                Ok(()) => return true,
                Err(err) => {
                    storage_attempts += 1;
                    if storage_attempts > self.config.max_transport_retries {
                        error!(
                            error = %err,
                            job_id = %enriched.id,
                            "storage retries exhausted; committing with logged failure"
                        );
                        self.commit(offset).await;
                        self.record(WorkerOutcome::FailureCommitted).await;
                        return false;
                    }
                    warn!(error = %err, job_id = %enriched.id, "storage upsert failed; retrying");
                    self.sleeper.sleep(self.config.retry_backoff).await;
                }
            }
        }
    }

    /// If a row already exists for this id, keep its original `created_at`
    /// so re-enrichment does not reset the timestamp (resolves the open
    /// question in the design notes in favor of preservation).
    async fn preserve_created_at(
        &self,
        mut enriched: crate::domain::types::EnrichedJob,
    ) -> crate::domain::types::EnrichedJob {
        match self.repository.find(&enriched.id).await {
            Ok(Some(existing)) => {
                enriched.created_at = existing.created_at;
                enriched
            }
            Ok(None) => enriched,
            Err(err) => {
                warn!(error = %err, job_id = %enriched.id, "could not check for existing row; using fresh created_at");
                enriched
            }
        }
    }

    async fn commit(&self, offset: LogOffset) {
        if let Err(err) = self.job_log.commit(offset).await {
            error!(error = %err, "commit failed");
        }
    }

    async fn record(&self, outcome: WorkerOutcome) {
        let _ = self.metrics.record_message(outcome).await;
    }
}

#[cfg(test)]
mod tests;
