//! Reqwest-backed adapter for the injected LLM collaborator (§6).
//!
//! Speaks an OpenAI-compatible chat-completions and embeddings surface;
//! swapping providers means swapping the base URL and request/response
//! shapes here, never touching the dispatcher.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{GenerationParams, LlmClient, LlmClientError};

pub struct ReqwestLlmClient {
    http: Client,
    base_url: String,
}

impl ReqwestLlmClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

fn classify_status(status: StatusCode, body: String) -> LlmClientError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        LlmClientError::rate_limited(body)
    } else if status.is_server_error() {
        LlmClientError::transport(format!("{status}: {body}"))
    } else {
        LlmClientError::other(format!("{status}: {body}"))
    }
}

#[async_trait]
impl LlmClient for ReqwestLlmClient {
    async fn generate(
        &self,
        model_id: &str,
        credential: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmClientError> {
        let request = ChatCompletionRequest {
            model: model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_output_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await
            .map_err(|err| LlmClientError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| LlmClientError::other(err.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmClientError::other("provider returned no choices".to_string()))
    }

    async fn embed(
        &self,
        model_id: &str,
        credential: &str,
        text: &str,
    ) -> Result<Vec<f32>, LlmClientError> {
        let request = EmbeddingRequest {
            model: model_id,
            input: text,
        };

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await
            .map_err(|err| LlmClientError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| LlmClientError::other(err.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .ok_or_else(|| LlmClientError::other("provider returned no embeddings".to_string()))
    }
}
