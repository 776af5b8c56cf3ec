use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::domain::llm_dispatcher::{DispatchSleeper, Dispatcher, DispatcherConfig};
use crate::domain::ports::{
    GenerationParams, MockDispatcherMetrics, MockJobRepository, MockLlmClient,
    MockMatcherMetrics,
};
use crate::domain::types::{EnrichedJob, Seniority};

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

fn build_dispatcher(client: MockLlmClient) -> Arc<Dispatcher> {
    let config = DispatcherConfig::new(vec!["cred-a".into()], "gen", "embed")
        .expect("valid config")
        .with_min_gap_between_calls(std::time::Duration::ZERO)
        .with_embedding_dim(3);
    Arc::new(Dispatcher::new(
        config,
        Arc::new(client),
        noop_dispatcher_metrics(),
        Arc::new(TickingClock(AtomicI64::new(0))),
        Arc::new(ImmediateSleeper),
    ))
}

fn stored_job(id: &str, skills: Vec<&str>, embedding: Vec<f32>) -> EnrichedJob {
    EnrichedJob {
        id: id.to_string(),
        company: "Acme".into(),
        position: "Engineer".into(),
        location: "Remote".into(),
        url: "https://example.invalid".into(),
        tags: vec![],
        description: "".into(),
        skills: skills.into_iter().map(String::from).collect(),
        seniority: Seniority::Mid,
        summary: "".into(),
        embedding,
        created_at: Utc.timestamp_opt(0, 0).single().expect("valid"),
    }
}

#[tokio::test]
async fn rejects_empty_resume_text() {
    let client = MockLlmClient::new();
    let dispatcher = build_dispatcher(client);
    let repository = Arc::new(MockJobRepository::new());
    let matcher = Arc::new(VectorMatcher::new(
        repository.clone(),
        Arc::new(MockMatcherMetrics::new()),
        3,
    ));
    let analyzer = ResumeAnalyzer::new(dispatcher, matcher, repository);

    let result = analyzer.analyze("   ", AnalysisOptions::default()).await;
    assert!(matches!(result, Err(AnalyzerError::Input(_))));
}

#[tokio::test]
async fn exhaustion_maps_to_busy() {
    let mut client = MockLlmClient::new();
    client.expect_generate().returning(|_, _, _, _: GenerationParams| {
        Box::pin(async {
            Err(crate::domain::ports::LlmClientError::RateLimited {
                message: "429".into(),
            })
        })
    });
    let dispatcher = build_dispatcher(client);
    let repository = Arc::new(MockJobRepository::new());
    let matcher = Arc::new(VectorMatcher::new(
        repository.clone(),
        Arc::new(MockMatcherMetrics::new()),
        3,
    ));
    let analyzer = ResumeAnalyzer::new(dispatcher, matcher, repository);

    let result = analyzer.analyze("experienced engineer", AnalysisOptions::default()).await;
    assert!(matches!(result, Err(AnalyzerError::Busy)));
}

#[tokio::test]
async fn combined_gap_call_annotates_top_matches_only() {
    let mut client = MockLlmClient::new();
    client
        .expect_generate()
        .times(1)
        .returning(|_, _, _, _: GenerationParams| {
            Box::pin(async {
                Ok("{\"skills\":[\"Rust\"],\"summary\":\"backend engineer\",\"job_titles\":[\"Engineer\"]}"
                    .to_string())
            })
        });
    client
        .expect_generate()
        .times(1)
        .returning(|_, _, _, _: GenerationParams| {
            Box::pin(async {
                Ok("[{\"missing\":[\"Go\"],\"matching\":[\"Rust\"],\"recommendations\":[\"learn Go\"]}]"
                    .to_string())
            })
        });
    client
        .expect_embed()
        .returning(|_, _, _| Box::pin(async { Ok(vec![1.0, 0.0, 0.0]) }));

    let dispatcher = build_dispatcher(client);

    let mut repository = MockJobRepository::new();
    repository
        .expect_query_candidates()
        .returning(|_| {
            Box::pin(async {
                Ok(vec![
                    crate::domain::types::CandidateMatch {
                        id: "job-1".into(),
                        embedding: vec![1.0, 0.0, 0.0],
                        seniority: Seniority::Mid,
                        skills: vec!["Rust".into()],
                    },
                    crate::domain::types::CandidateMatch {
                        id: "job-2".into(),
                        embedding: vec![0.0, 1.0, 0.0],
                        seniority: Seniority::Mid,
                        skills: vec!["Go".into()],
                    },
                ])
            })
        });
    repository
        .expect_find()
        .withf(|id| id == "job-1")
        .returning(|_| Box::pin(async { Ok(Some(stored_job("job-1", vec!["Rust"], vec![1.0, 0.0, 0.0]))) }));

    let repository = Arc::new(repository);
    let matcher = Arc::new(VectorMatcher::new(
        repository.clone(),
        Arc::new(MockMatcherMetrics::new()),
        3,
    ));
    let analyzer = ResumeAnalyzer::new(dispatcher, matcher, repository);

    let options = AnalysisOptions {
        limit: 5,
        min_similarity: 0.0,
        include_gap: true,
        gap_depth: 1,
    };
    let result = analyzer
        .analyze("Rust backend engineer", options)
        .await
        .expect("analysis succeeds");

    assert_eq!(result.matches.len(), 2);
    assert!(result.matches[0].gap.is_some());
    assert!(result.matches[1].gap.is_none());
}

#[tokio::test]
async fn extra_gaps_beyond_depth_are_not_spliced_onto_remaining_matches() {
    let mut client = MockLlmClient::new();
    client
        .expect_generate()
        .times(1)
        .returning(|_, _, _, _: GenerationParams| {
            Box::pin(async {
                Ok("{\"skills\":[\"Rust\"],\"summary\":\"backend engineer\",\"job_titles\":[\"Engineer\"]}"
                    .to_string())
            })
        });
    // A misbehaving provider returns more gap objects than jobs were asked
    // for; only the first `gap_depth` matches may be annotated.
    client
        .expect_generate()
        .times(1)
        .returning(|_, _, _, _: GenerationParams| {
            Box::pin(async {
                Ok(
                    "[{\"missing\":[\"Go\"],\"matching\":[\"Rust\"],\"recommendations\":[\"learn Go\"]}, \
                      {\"missing\":[],\"matching\":[\"Go\"],\"recommendations\":[]}]"
                        .to_string(),
                )
            })
        });
    client
        .expect_embed()
        .returning(|_, _, _| Box::pin(async { Ok(vec![1.0, 0.0, 0.0]) }));

    let dispatcher = build_dispatcher(client);

    let mut repository = MockJobRepository::new();
    repository.expect_query_candidates().returning(|_| {
        Box::pin(async {
            Ok(vec![
                crate::domain::types::CandidateMatch {
                    id: "job-1".into(),
                    embedding: vec![1.0, 0.0, 0.0],
                    seniority: Seniority::Mid,
                    skills: vec!["Rust".into()],
                },
                crate::domain::types::CandidateMatch {
                    id: "job-2".into(),
                    embedding: vec![0.0, 1.0, 0.0],
                    seniority: Seniority::Mid,
                    skills: vec!["Go".into()],
                },
            ])
        })
    });
    repository
        .expect_find()
        .withf(|id| id == "job-1")
        .returning(|_| Box::pin(async { Ok(Some(stored_job("job-1", vec!["Rust"], vec![1.0, 0.0, 0.0]))) }));

    let repository = Arc::new(repository);
    let matcher = Arc::new(VectorMatcher::new(
        repository.clone(),
        Arc::new(MockMatcherMetrics::new()),
        3,
    ));
    let analyzer = ResumeAnalyzer::new(dispatcher, matcher, repository);

    let options = AnalysisOptions {
        limit: 5,
        min_similarity: 0.0,
        include_gap: true,
        gap_depth: 1,
    };
    let result = analyzer
        .analyze("Rust backend engineer", options)
        .await
        .expect("analysis succeeds");

    assert_eq!(result.matches.len(), 2);
    assert!(result.matches[0].gap.is_some());
    assert!(
        result.matches[1].gap.is_none(),
        "second gap object must not spill past gap_depth onto the remaining match"
    );
}
