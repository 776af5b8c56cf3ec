//! Error kinds emitted by the dispatcher (§7).

use crate::domain::ports::LlmClientError;

/// The three outcomes C1 may surface to its callers (C2 and C4), distinct
/// from a plain success.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// Every credential was attempted (or cooling) through the retry
    /// budget without a success.
    #[error("all credentials exhausted: {message}")]
    Exhausted { message: String },
    /// A non-rate-limit provider failure.
    #[error("transport failure: {message}")]
    Transport { message: String },
    /// The provider's output failed schema, shape, or dimensionality
    /// validation.
    #[error("parse failure: {message}")]
    Parse { message: String },
}

impl From<LlmClientError> for DispatchError {
    /// Maps everything except rate-limiting, which the dispatch loop
    /// handles itself before this conversion would ever run.
    fn from(err: LlmClientError) -> Self {
        match err {
            LlmClientError::RateLimited { message } => Self::Transport { message },
            LlmClientError::Transport { message } => Self::Transport { message },
            LlmClientError::Other { message } => Self::Transport { message },
        }
    }
}
