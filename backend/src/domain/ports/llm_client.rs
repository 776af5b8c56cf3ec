//! Port for the injected LLM collaborator consumed exclusively by the
//! credential dispatcher.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::define_port_error;

/// Parameters threaded through to the provider on a generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

define_port_error!(
    /// Outcome classification the dispatcher relies on to decide between
    /// rotating credentials, retrying, or surfacing a transport failure.
    pub enum LlmClientError {
        #[error("rate limited: {message}")]
        RateLimited { message: String },
        #[error("transport failure: {message}")]
        Transport { message: String },
        #[error("provider error: {message}")]
        Other { message: String },
    }
);

impl LlmClientError {
    /// True for the rate-limit classification the dispatcher retries against
    /// a different credential slot.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// The shape the dispatcher depends on; the concrete provider (OpenAI,
/// Anthropic, a local model server, ...) is injected by the outbound
/// adapter.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate free text from a prompt using `model_id`.
    async fn generate(
        &self,
        model_id: &str,
        credential: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmClientError>;

    /// Produce an embedding vector for `text` using `model_id`. The
    /// dispatcher validates the returned dimensionality; this port makes no
    /// promise about vector length.
    async fn embed(
        &self,
        model_id: &str,
        credential: &str,
        text: &str,
    ) -> Result<Vec<f32>, LlmClientError>;
}
