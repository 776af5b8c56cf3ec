//! Port for the durable, partitioned message log consumed by the stream
//! worker (C3).

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::define_port_error;

define_port_error!(
    pub enum JobLogError {
        #[error("log unavailable: {message}")]
        Unavailable { message: String },
        #[error("commit failed: {message}")]
        CommitFailed { message: String },
    }
);

/// An opaque handle identifying a polled message's position, returned so the
/// worker can commit without re-encoding the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOffset(pub String);

/// A raw, self-describing record pulled from the log, not yet decoded into a
/// `RawJob`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogMessage {
    pub offset: LogOffset,
    pub payload: Vec<u8>,
}

/// Consumer-side contract for the durable job log. Implementations provide
/// at-least-once delivery; the worker commits only after a message has been
/// fully handled (or deliberately discarded as poison).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobLog: Send + Sync {
    /// Poll for the next message for this consumer-group member, waiting up
    /// to `timeout` before returning `None`.
    async fn poll(&self, timeout: Duration) -> Result<Option<RawLogMessage>, JobLogError>;

    /// Acknowledge a message, advancing the committed consumer-group
    /// position past `offset`.
    async fn commit(&self, offset: LogOffset) -> Result<(), JobLogError>;
}
