//! Dispatcher configuration, sourced from the process environment at
//! startup (see `crate::server::config`) and otherwise immutable.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatcherConfigError {
    EmptyCredentials,
}

impl std::fmt::Display for DispatcherConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCredentials => write!(f, "credentials list must not be empty"),
        }
    }
}

impl std::error::Error for DispatcherConfigError {}

/// Enumerated options recognized by the dispatcher at startup (§4.1, §6).
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub credentials: Vec<String>,
    pub model_generate: String,
    pub model_embed: String,
    pub min_gap_between_calls: Duration,
    pub per_slot_cooldown: Duration,
    pub max_retries_on_rate_limit: usize,
    pub embedding_dim: usize,
    pub max_output_tokens: u32,
    pub generation_temperature: f32,
}

impl DispatcherConfig {
    /// Build a configuration with the documented defaults, validating that
    /// `credentials` is non-empty.
    pub fn new(
        credentials: Vec<String>,
        model_generate: impl Into<String>,
        model_embed: impl Into<String>,
    ) -> Result<Self, DispatcherConfigError> {
        if credentials.is_empty() {
            return Err(DispatcherConfigError::EmptyCredentials);
        }
        let retries = credentials.len();
        Ok(Self {
            credentials,
            model_generate: model_generate.into(),
            model_embed: model_embed.into(),
            min_gap_between_calls: Duration::from_secs(2),
            per_slot_cooldown: Duration::from_secs(60),
            max_retries_on_rate_limit: retries,
            embedding_dim: 768,
            max_output_tokens: 1024,
            generation_temperature: 0.2,
        })
    }

    pub fn with_min_gap_between_calls(mut self, gap: Duration) -> Self {
        self.min_gap_between_calls = gap;
        self
    }

    pub fn with_per_slot_cooldown(mut self, cooldown: Duration) -> Self {
        self.per_slot_cooldown = cooldown;
        self
    }

    pub fn with_max_retries_on_rate_limit(mut self, retries: usize) -> Self {
        self.max_retries_on_rate_limit = retries;
        self
    }

    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_credential_list() {
        assert_eq!(
            DispatcherConfig::new(vec![], "gen", "embed").unwrap_err(),
            DispatcherConfigError::EmptyCredentials
        );
    }

    #[test]
    fn retry_budget_defaults_to_pool_size() {
        let config =
            DispatcherConfig::new(vec!["a".into(), "b".into(), "c".into()], "gen", "embed")
                .expect("valid config");
        assert_eq!(config.max_retries_on_rate_limit, 3);
    }
}
