use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mockall::predicate::eq;

use super::*;
use crate::domain::llm_dispatcher::{Dispatcher, DispatcherConfig};
use crate::domain::ports::{
    GenerationParams, LlmClientError, MockDispatcherMetrics, MockJobCache, MockJobLog,
    MockJobRepository, MockLlmClient, MockWorkerMetrics,
};

struct TickingClock(AtomicI64);

impl mockable::Clock for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.0.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }
}

struct ImmediateSleeper;

#[async_trait]
impl DispatchSleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: std::time::Duration) {}
}

fn noop_dispatcher_metrics() -> Arc<MockDispatcherMetrics> {
    let mut metrics = MockDispatcherMetrics::new();
    metrics.expect_record_attempt().returning(|_, _| Box::pin(async { Ok(()) }));
    metrics.expect_record_cooldown().returning(|_| Box::pin(async { Ok(()) }));
    Arc::new(metrics)
}

fn build_enrichment(client: MockLlmClient) -> Arc<EnrichmentTransform> {
    let config = DispatcherConfig::new(vec!["cred-a".into()], "gen", "embed")
        .expect("valid config")
        .with_min_gap_between_calls(std::time::Duration::ZERO);
    let dispatcher = Dispatcher::new(
        config,
        Arc::new(client),
        noop_dispatcher_metrics(),
        Arc::new(TickingClock(AtomicI64::new(0))),
        Arc::new(ImmediateSleeper),
    );
    Arc::new(EnrichmentTransform::new(
        Arc::new(dispatcher),
        Arc::new(TickingClock(AtomicI64::new(100))),
    ))
}

fn sample_message(id: &str) -> RawLogMessage {
    let raw = RawJob {
        id: id.to_string(),
        company: "Acme".into(),
        position: "Senior Python Developer".into(),
        location: "Remote".into(),
        url: "https://example.invalid/job".into(),
        tags: vec!["python".into()],
        description: "Python, AWS, Docker".into(),
    };
    RawLogMessage {
        offset: LogOffset(id.to_string()),
        payload: serde_json::to_vec(&raw).expect("raw job serializes"),
    }
}

fn noop_worker_metrics() -> Arc<MockWorkerMetrics> {
    let mut metrics = MockWorkerMetrics::new();
    metrics.expect_record_message().returning(|_| Box::pin(async { Ok(()) }));
    Arc::new(metrics)
}

#[tokio::test]
async fn happy_path_upserts_caches_and_commits() {
    let mut client = MockLlmClient::new();
    client.expect_generate().returning(|_, _, _, _: GenerationParams| {
        Box::pin(async {
            Ok("{\"skills\":[\"Python\",\"AWS\",\"Docker\"],\"seniority\":\"Senior\",\"summary\":\"ok\"}"
                .to_string())
        })
    });
    client
        .expect_embed()
        .returning(|_, _, _| Box::pin(async { Ok(vec![0.1; 768]) }));

    let enrichment = build_enrichment(client);

    let mut job_log = MockJobLog::new();
    job_log
        .expect_commit()
        .with(eq(LogOffset("J1".into())))
        .returning(|_| Box::pin(async { Ok(()) }));

    let mut repository = MockJobRepository::new();
    repository.expect_find().returning(|_| Box::pin(async { Ok(None) }));
    repository
        .expect_upsert()
        .withf(|job| job.embedding.len() == 768 && job.skills == vec!["Python", "AWS", "Docker"])
        .returning(|_| Box::pin(async { Ok(()) }));

    let mut cache = MockJobCache::new();
    cache
        .expect_cache_job()
        .returning(|_, _, _| Box::pin(async { Ok(()) }));

    let worker = StreamWorker::new(
        Arc::new(job_log),
        enrichment,
        Arc::new(repository),
        Arc::new(cache),
        noop_worker_metrics(),
        Arc::new(ImmediateSleeper),
        StreamWorkerConfig::default(),
    );

    worker.process_message(sample_message("J1")).await;
}

#[tokio::test]
async fn poison_message_commits_without_invoking_dispatcher() {
    let client = MockLlmClient::new();
    let enrichment = build_enrichment(client);

    let mut job_log = MockJobLog::new();
    job_log
        .expect_commit()
        .with(eq(LogOffset("bad".into())))
        .returning(|_| Box::pin(async { Ok(()) }));

    let repository = MockJobRepository::new();
    let cache = MockJobCache::new();

    let worker = StreamWorker::new(
        Arc::new(job_log),
        enrichment,
        Arc::new(repository),
        Arc::new(cache),
        noop_worker_metrics(),
        Arc::new(ImmediateSleeper),
        StreamWorkerConfig::default(),
    );

    let message = RawLogMessage {
        offset: LogOffset("bad".into()),
        payload: b"not json".to_vec(),
    };
    worker.process_message(message).await;
}

#[tokio::test]
async fn transport_errors_commit_with_logged_failure_after_retry_budget() {
    let mut client = MockLlmClient::new();
    client.expect_generate().returning(|_, _, _, _: GenerationParams| {
        Box::pin(async {
            Err(LlmClientError::Transport {
                message: "connection reset".into(),
            })
        })
    });

    let enrichment = build_enrichment(client);

    let mut job_log = MockJobLog::new();
    job_log
        .expect_commit()
        .with(eq(LogOffset("J2".into())))
        .returning(|_| Box::pin(async { Ok(()) }));

    let repository = MockJobRepository::new();
    let cache = MockJobCache::new();

    let worker = StreamWorker::new(
        Arc::new(job_log),
        enrichment,
        Arc::new(repository),
        Arc::new(cache),
        noop_worker_metrics(),
        Arc::new(ImmediateSleeper),
        StreamWorkerConfig {
            max_transport_retries: 2,
            ..StreamWorkerConfig::default()
        },
    );

    worker.process_message(sample_message("J2")).await;
}

#[tokio::test]
async fn storage_errors_do_not_commit_until_upsert_succeeds() {
    use crate::domain::ports::JobRepositoryError;
    use std::sync::atomic::AtomicUsize;

    let mut client = MockLlmClient::new();
    client.expect_generate().returning(|_, _, _, _: GenerationParams| {
        Box::pin(async {
            Ok("{\"skills\":[\"Python\"],\"seniority\":\"Senior\",\"summary\":\"ok\"}".to_string())
        })
    });
    client
        .expect_embed()
        .returning(|_, _, _| Box::pin(async { Ok(vec![0.1; 768]) }));

    let enrichment = build_enrichment(client);

    let mut job_log = MockJobLog::new();
    job_log
        .expect_commit()
        .with(eq(LogOffset("J3".into())))
        .returning(|_| Box::pin(async { Ok(()) }));

    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_closure = attempts.clone();
    let mut repository = MockJobRepository::new();
    repository.expect_find().returning(|_| Box::pin(async { Ok(None) }));
    repository.expect_upsert().returning(move |_| {
        let attempt = attempts_for_closure.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if attempt == 0 {
                Err(JobRepositoryError::write("connection reset"))
            } else {
                Ok(())
            }
        })
    });

    let mut cache = MockJobCache::new();
    cache
        .expect_cache_job()
        .returning(|_, _, _| Box::pin(async { Ok(()) }));

    let worker = StreamWorker::new(
        Arc::new(job_log),
        enrichment,
        Arc::new(repository),
        Arc::new(cache),
        noop_worker_metrics(),
        Arc::new(ImmediateSleeper),
        StreamWorkerConfig::default(),
    );

    worker.process_message(sample_message("J3")).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 2, "expected one failed attempt then a success");
}

#[tokio::test]
async fn storage_errors_commit_with_logged_failure_after_retry_budget() {
    use crate::domain::ports::JobRepositoryError;

    let mut client = MockLlmClient::new();
    client.expect_generate().returning(|_, _, _, _: GenerationParams| {
        Box::pin(async {
            Ok("{\"skills\":[\"Python\"],\"seniority\":\"Senior\",\"summary\":\"ok\"}".to_string())
        })
    });
    client
        .expect_embed()
        .returning(|_, _, _| Box::pin(async { Ok(vec![0.1; 768]) }));

    let enrichment = build_enrichment(client);

    let mut job_log = MockJobLog::new();
    job_log
        .expect_commit()
        .with(eq(LogOffset("J4".into())))
        .returning(|_| Box::pin(async { Ok(()) }));

    let mut repository = MockJobRepository::new();
    repository.expect_find().returning(|_| Box::pin(async { Ok(None) }));
    repository
        .expect_upsert()
        .returning(|_| Box::pin(async { Err(JobRepositoryError::write("db is down")) }));

    // No cache expectation: the cache write must never be reached once the
    // storage retry budget is exhausted.
    let cache = MockJobCache::new();

    let worker = StreamWorker::new(
        Arc::new(job_log),
        enrichment,
        Arc::new(repository),
        Arc::new(cache),
        noop_worker_metrics(),
        Arc::new(ImmediateSleeper),
        StreamWorkerConfig {
            max_transport_retries: 1,
            ..StreamWorkerConfig::default()
        },
    );

    worker.process_message(sample_message("J4")).await;
}
