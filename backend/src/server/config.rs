//! Process configuration, sourced entirely from the environment (§6).
//!
//! No other environment read occurs in the core: the dispatcher, worker, and
//! storage adapters all take their settings from the single [`ServerConfig`]
//! built here at startup.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

use crate::domain::llm_dispatcher::{DispatcherConfig, DispatcherConfigError};
use crate::domain::stream_worker::StreamWorkerConfig;

/// Errors that abort process boot because a required configuration value is
/// absent (§1a: "missing required values... are a startup-time `Err` that
/// aborts boot rather than limping forward").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerConfigError {
    /// The dispatcher's own required-value check (an empty credentials list).
    #[error(transparent)]
    Dispatcher(#[from] DispatcherConfigError),
    /// A required environment variable was not set.
    #[error("required environment variable {name} is not set")]
    MissingEnv { name: &'static str },
}

fn required_env(name: &'static str) -> Result<String, ServerConfigError> {
    env::var(name).map_err(|_| ServerConfigError::MissingEnv { name })
}

/// Top-level process configuration assembled from environment variables.
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub redis_url: String,
    pub llm_base_url: String,
    pub dispatcher: DispatcherConfig,
    pub stream_worker: StreamWorkerConfig,
    pub consumer_id: String,
}

fn env_duration(name: &str, default: Duration) -> Duration {
    match env::var(name) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(name, value = %raw, "invalid duration; using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    match env::var(name) {
        Ok(raw) => match raw.parse::<usize>() {
            Ok(value) => value,
            Err(_) => {
                warn!(name, value = %raw, "invalid integer; using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    match env::var(name) {
        Ok(raw) => match raw.parse::<u32>() {
            Ok(value) => value,
            Err(_) => {
                warn!(name, value = %raw, "invalid integer; using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_f32(name: &str, default: f32) -> f32 {
    match env::var(name) {
        Ok(raw) => match raw.parse::<f32>() {
            Ok(value) => value,
            Err(_) => {
                warn!(name, value = %raw, "invalid float; using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn bind_address() -> SocketAddr {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = match env::var("PORT") {
        Ok(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
            warn!(value = %raw, "invalid PORT; falling back to 8080");
            8080
        }),
        Err(_) => 8080,
    };
    format!("{host}:{port}")
        .parse()
        .unwrap_or_else(|_| "0.0.0.0:8080".parse().unwrap_or_else(|_| unreachable!()))
}

fn credentials_from_env() -> Vec<String> {
    env::var("LLM_CREDENTIALS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl ServerConfig {
    /// Build configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a required value is unset: `LLM_CREDENTIALS` (the
    /// dispatcher cannot run without at least one credential), `DATABASE_URL`,
    /// or `REDIS_URL`.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        let credentials = credentials_from_env();
        let model_generate =
            env::var("LLM_MODEL_GENERATE").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let model_embed =
            env::var("LLM_MODEL_EMBED").unwrap_or_else(|_| "text-embedding-3-small".to_string());

        let dispatcher = DispatcherConfig::new(credentials, model_generate, model_embed)?;
        let default_max_retries = dispatcher.max_retries_on_rate_limit;
        let dispatcher = dispatcher
            .with_min_gap_between_calls(env_duration(
                "DISPATCHER_MIN_GAP_SECONDS",
                Duration::from_secs(2),
            ))
            .with_per_slot_cooldown(env_duration(
                "DISPATCHER_PER_SLOT_COOLDOWN_SECONDS",
                Duration::from_secs(60),
            ))
            .with_max_retries_on_rate_limit(env_usize("DISPATCHER_MAX_RETRIES", default_max_retries))
            .with_embedding_dim(env_usize("DISPATCHER_EMBEDDING_DIM", 768));
        let dispatcher = DispatcherConfig {
            max_output_tokens: env_u32("DISPATCHER_MAX_OUTPUT_TOKENS", dispatcher.max_output_tokens),
            generation_temperature: env_f32(
                "DISPATCHER_TEMPERATURE",
                dispatcher.generation_temperature,
            ),
            ..dispatcher
        };

        let stream_worker = StreamWorkerConfig {
            poll_timeout: env_duration("WORKER_POLL_TIMEOUT_SECONDS", Duration::from_secs(5)),
            max_transport_retries: env_usize("WORKER_MAX_TRANSPORT_RETRIES", 3),
            retry_backoff: env_duration("WORKER_RETRY_BACKOFF_SECS", Duration::from_secs(1)),
            cache_ttl: env_duration("WORKER_CACHE_TTL_SECS", Duration::from_secs(3600)),
        };

        Ok(Self {
            bind_addr: bind_address(),
            database_url: required_env("DATABASE_URL")?,
            redis_url: required_env("REDIS_URL")?,
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            dispatcher,
            stream_worker,
            consumer_id: env::var("WORKER_CONSUMER_ID").unwrap_or_else(|_| {
                format!("worker-{}", uuid::Uuid::new_v4())
            }),
        })
    }
}
