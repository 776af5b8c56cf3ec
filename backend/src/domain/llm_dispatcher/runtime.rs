//! Clock and sleep abstractions the dispatch loop suspends on, kept
//! injectable so tests can run the throttle and cooldown waits without real
//! time passing.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Abstraction over an async sleep, mirroring `tokio::time::sleep` but
/// mockable in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DispatchSleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the Tokio runtime.
pub struct TokioSleeper;

#[async_trait]
impl DispatchSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
