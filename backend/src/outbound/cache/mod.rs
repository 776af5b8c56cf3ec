//! Redis-backed [`JobCache`] adapter.
//!
//! Best-effort only: every error is mapped to [`JobCacheError::Unavailable`]
//! and the stream worker logs and carries on rather than failing a message
//! over a cache miss (§4.3). Keys are namespaced (`job:v1:<id>`) so a future
//! schema change can invalidate old entries by bumping the prefix.

use std::time::Duration;

use async_trait::async_trait;
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use redis::AsyncCommands;

use crate::domain::ports::{JobCache, JobCacheError};
use crate::domain::types::EnrichedJob;

const KEY_PREFIX: &str = "job:v1:";

pub struct RedisJobCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisJobCache {
    pub fn new(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }
}

fn cache_key(id: &str) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Spread cache expiry by up to 10% of the configured TTL, so replicas
/// writing many jobs in quick succession don't evict them all at once.
fn jittered_ttl_secs(ttl: Duration) -> u64 {
    let base = ttl.as_secs().max(1);
    let spread = i64::try_from(base / 10).unwrap_or(i64::MAX).max(1);
    let base_signed = i64::try_from(base).unwrap_or(i64::MAX);
    let jitter = SmallRng::from_entropy().gen_range(-spread..=spread);
    u64::try_from(base_signed.saturating_add(jitter).max(1)).unwrap_or(1)
}

#[async_trait]
impl JobCache for RedisJobCache {
    async fn cache_job(
        &self,
        id: &str,
        job: &EnrichedJob,
        ttl: Duration,
    ) -> Result<(), JobCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| JobCacheError::unavailable(err.to_string()))?;

        let payload = serde_json::to_string(job)
            .map_err(|err| JobCacheError::unavailable(err.to_string()))?;

        conn.set_ex::<_, _, ()>(cache_key(id), payload, jittered_ttl_secs(ttl))
            .await
            .map_err(|err| JobCacheError::unavailable(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_ten_percent_of_base() {
        let ttl = Duration::from_secs(3600);
        for _ in 0..50 {
            let jittered = jittered_ttl_secs(ttl);
            assert!((3240..=3960).contains(&jittered), "{jittered} out of range");
        }
    }

    #[test]
    fn small_ttl_never_jitters_to_zero() {
        let jittered = jittered_ttl_secs(Duration::from_secs(1));
        assert!(jittered >= 1);
    }
}
