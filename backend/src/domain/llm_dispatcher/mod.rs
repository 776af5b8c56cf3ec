//! Credential Pool & Dispatcher (C1): the single choke point for all LLM
//! traffic. See §4.1. Shields C2 and C4 from credential rotation,
//! throttling, and retry — callers see success, [`DispatchError::Exhausted`],
//! or [`DispatchError::Transport`]/[`DispatchError::Parse`].

mod config;
mod error;
mod policy;
mod runtime;

pub use config::{DispatcherConfig, DispatcherConfigError};
pub use error::DispatchError;
pub use runtime::{DispatchSleeper, TokioSleeper};

use std::sync::Arc;

use futures_util::future::BoxFuture;
use mockable::Clock;
use tokio::sync::Mutex;

use crate::domain::ports::{
    DispatchOutcome, DispatcherMetrics, GenerationParams, LlmClient, LlmClientError,
};

use self::policy::{CredentialPool, SlotSelection};

struct DispatcherState {
    pool: CredentialPool,
    last_call_ts: Option<chrono::DateTime<chrono::Utc>>,
}

/// The dispatcher itself. All state is serialized behind a single async
/// mutex per §5: "All calls through the dispatcher take a single mutex for
/// the duration of select slot → throttle wait → invoke → classify."
pub struct Dispatcher {
    client: Arc<dyn LlmClient>,
    metrics: Arc<dyn DispatcherMetrics>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn DispatchSleeper>,
    config: DispatcherConfig,
    state: Mutex<DispatcherState>,
}

impl Dispatcher {
    pub fn new(
        config: DispatcherConfig,
        client: Arc<dyn LlmClient>,
        metrics: Arc<dyn DispatcherMetrics>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn DispatchSleeper>,
    ) -> Self {
        let pool = CredentialPool::new(config.credentials.clone());
        Self {
            client,
            metrics,
            clock,
            sleeper,
            config,
            state: Mutex::new(DispatcherState {
                pool,
                last_call_ts: None,
            }),
        }
    }

    /// Generate free text from `prompt`.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, DispatchError> {
        let client = Arc::clone(&self.client);
        let model = self.config.model_generate.clone();
        let prompt = prompt.to_string();
        let params = GenerationParams {
            temperature: self.config.generation_temperature,
            max_output_tokens: self.config.max_output_tokens,
        };
        let invoke = move |credential: String| -> BoxFuture<'static, Result<String, LlmClientError>> {
            let client = Arc::clone(&client);
            let model = model.clone();
            let prompt = prompt.clone();
            Box::pin(async move { client.generate(&model, &credential, &prompt, params).await })
        };
        self.run_dispatch(invoke).await
    }

    /// Generate a single JSON object matching `T` from `prompt`. Strips
    /// surrounding code-fence markup before parsing (§4.1 structured-output
    /// contract); a shape mismatch surfaces as [`DispatchError::Parse`].
    pub async fn generate_structured<T>(&self, prompt: &str) -> Result<T, DispatchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let raw = self.generate_text(prompt).await?;
        let json = strip_code_fence(&raw);
        serde_json::from_str(json).map_err(|err| DispatchError::Parse {
            message: format!("structured output did not match the expected shape: {err}"),
        })
    }

    /// Produce an embedding for `text`. Fails with [`DispatchError::Parse`]
    /// if the provider returns a vector whose length does not equal the
    /// configured dimensionality; never pads or truncates (§4.1 embedding
    /// contract).
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, DispatchError> {
        let client = Arc::clone(&self.client);
        let model = self.config.model_embed.clone();
        let text = text.to_string();
        let invoke = move |credential: String| -> BoxFuture<'static, Result<Vec<f32>, LlmClientError>> {
            let client = Arc::clone(&client);
            let model = model.clone();
            let text = text.clone();
            Box::pin(async move { client.embed(&model, &credential, &text).await })
        };
        let vector = self.run_dispatch(invoke).await?;
        if vector.len() != self.config.embedding_dim {
            return Err(DispatchError::Parse {
                message: format!(
                    "embedding dimensionality mismatch: got {} want {}",
                    vector.len(),
                    self.config.embedding_dim
                ),
            });
        }
        Ok(vector)
    }

    /// The dispatch protocol: throttle, select a slot, invoke, classify
    /// (§4.1 steps 1–5), serialized under `self.state`'s mutex for the
    /// caller's entire attempt sequence.
    async fn run_dispatch<T, F>(&self, invoke: F) -> Result<T, DispatchError>
    where
        F: Fn(String) -> BoxFuture<'static, Result<T, LlmClientError>> + Send + Sync,
    {
        let mut state = self.state.lock().await;
        let mut retry_count = 0usize;
        let gap = chrono::Duration::from_std(self.config.min_gap_between_calls)
            .unwrap_or_else(|_| chrono::Duration::zero());
        let cooldown = chrono::Duration::from_std(self.config.per_slot_cooldown)
            .unwrap_or_else(|_| chrono::Duration::zero());

        loop {
            // Step 1: throttle.
            let now = self.clock.now();
            if let Some(last) = state.last_call_ts {
                let earliest = last + gap;
                if earliest > now {
                    let wait = (earliest - now).to_std().unwrap_or(std::time::Duration::ZERO);
                    self.sleeper.sleep(wait).await;
                }
            }
            state.last_call_ts = Some(self.clock.now());

            // Step 2: select slot, waiting out cooldowns if every slot is
            // cooling.
            let idx = loop {
                match state.pool.select(self.clock.now()) {
                    SlotSelection::Ready(idx) => break idx,
                    SlotSelection::AllCooling { until } => {
                        let now = self.clock.now();
                        let wait = (until - now).to_std().unwrap_or(std::time::Duration::ZERO);
                        self.sleeper.sleep(wait).await;
                    }
                }
            };

            // Step 3: invoke.
            let credential = state.pool.credential(idx).to_string();
            let outcome = invoke(credential).await;

            // Step 4: classify.
            match outcome {
                Ok(value) => {
                    state.pool.mark_success(idx, self.clock.now());
                    let _ = self
                        .metrics
                        .record_attempt(idx, DispatchOutcome::Success)
                        .await;
                    return Ok(value);
                }
                Err(LlmClientError::RateLimited { .. }) => {
                    state.pool.mark_rate_limited(idx, self.clock.now(), cooldown);
                    let _ = self.metrics.record_cooldown(idx).await;
                    let _ = self
                        .metrics
                        .record_attempt(idx, DispatchOutcome::RateLimited)
                        .await;
                    retry_count += 1;
                    if retry_count >= self.config.max_retries_on_rate_limit {
                        let _ = self
                            .metrics
                            .record_attempt(idx, DispatchOutcome::Exhausted)
                            .await;
                        return Err(DispatchError::Exhausted {
                            message: format!(
                                "exhausted after {retry_count} rate-limited attempt(s) across {} credential(s)",
                                state.pool.len()
                            ),
                        });
                    }
                    // back to step 1
                }
                Err(err) => {
                    let _ = self
                        .metrics
                        .record_attempt(idx, DispatchOutcome::Transport)
                        .await;
                    return Err(err.into());
                }
            }
        }
    }
}

/// Strip a leading/trailing ```` ```json ```` or ```` ``` ```` fence if
/// present; otherwise return the input unchanged.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(without_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let without_open = without_open
        .strip_prefix("json")
        .unwrap_or(without_open)
        .trim_start_matches(['\n', '\r']);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}
