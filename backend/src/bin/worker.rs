#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! Stream worker entry-point (C3): polls the durable job log, enriches raw
//! jobs through the dispatcher, and upserts them into storage. Intended to
//! run as its own process so it can be scaled independently of the HTTP
//! server; each replica uses a distinct consumer-group identity (§5).

use std::sync::Arc;

use bb8::Pool as Bb8Pool;
use bb8_redis::RedisConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::enrichment::EnrichmentTransform;
use backend::domain::llm_dispatcher::{Dispatcher, TokioSleeper};
use backend::domain::ports::{NoOpDispatcherMetrics, NoOpWorkerMetrics};
use backend::domain::stream_worker::StreamWorker;
use backend::outbound::cache::RedisJobCache;
use backend::outbound::llm::ReqwestLlmClient;
use backend::outbound::persistence::{DbPool, DieselJobRepository, PoolConfig};
use backend::outbound::queue::PostgresJobLog;
use backend::server::ServerConfig;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    let llm_client = Arc::new(ReqwestLlmClient::new(
        reqwest::Client::new(),
        config.llm_base_url.clone(),
    ));
    let dispatcher = Arc::new(Dispatcher::new(
        config.dispatcher.clone(),
        llm_client,
        Arc::new(NoOpDispatcherMetrics),
        Arc::new(mockable::DefaultClock),
        Arc::new(TokioSleeper),
    ));
    let enrichment = Arc::new(EnrichmentTransform::new(
        dispatcher,
        Arc::new(mockable::DefaultClock),
    ));

    let db_pool = DbPool::new(PoolConfig::new(config.database_url.clone()))
        .await
        .map_err(std::io::Error::other)?;
    let repository = Arc::new(DieselJobRepository::new(db_pool));

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    let job_log = Arc::new(PostgresJobLog::new(pg_pool, config.consumer_id.clone()));

    let redis_manager =
        RedisConnectionManager::new(config.redis_url.clone()).map_err(std::io::Error::other)?;
    let redis_pool = Bb8Pool::builder()
        .build(redis_manager)
        .await
        .map_err(std::io::Error::other)?;
    let cache = Arc::new(RedisJobCache::new(redis_pool));

    let worker = StreamWorker::new(
        job_log,
        enrichment,
        repository,
        cache,
        Arc::new(NoOpWorkerMetrics),
        Arc::new(TokioSleeper),
        config.stream_worker,
    );

    info!(consumer_id = %config.consumer_id, "stream worker starting");
    worker.run().await;
    Ok(())
}
