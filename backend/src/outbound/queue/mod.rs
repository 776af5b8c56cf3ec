//! Postgres-backed [`JobLog`] adapter.
//!
//! Apalis models a job queue as a status-tagged table claimed with
//! `UPDATE ... WHERE status = 'pending' ... SKIP LOCKED`; this adapter
//! follows the same claim-then-commit shape over a plain `sqlx` pool so the
//! stream worker gets at-least-once delivery without taking on apalis's
//! worker-registration machinery, which this single-consumer loop doesn't
//! need.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::ports::{JobLog, JobLogError, LogOffset, RawLogMessage};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct PostgresJobLog {
    pool: PgPool,
    consumer: String,
}

impl PostgresJobLog {
    pub fn new(pool: PgPool, consumer: impl Into<String>) -> Self {
        Self {
            pool,
            consumer: consumer.into(),
        }
    }

    async fn claim_one(&self) -> Result<Option<RawLogMessage>, JobLogError> {
        let row = sqlx::query(
            "UPDATE job_queue SET status = 'running', locked_by = $1, locked_at = now() \
             WHERE id = ( \
                 SELECT id FROM job_queue WHERE status = 'pending' \
                 ORDER BY id FOR UPDATE SKIP LOCKED LIMIT 1 \
             ) RETURNING id, payload",
        )
        .bind(&self.consumer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| JobLogError::unavailable(err.to_string()))?;

        Ok(row.map(|row| {
            let id: i64 = row.get("id");
            let payload: Vec<u8> = row.get("payload");
            RawLogMessage {
                offset: LogOffset(id.to_string()),
                payload,
            }
        }))
    }
}

#[async_trait]
impl JobLog for PostgresJobLog {
    async fn poll(&self, timeout: Duration) -> Result<Option<RawLogMessage>, JobLogError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(message) = self.claim_one().await? {
                return Ok(Some(message));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn commit(&self, offset: LogOffset) -> Result<(), JobLogError> {
        let id: i64 = offset
            .0
            .parse()
            .map_err(|_| JobLogError::commit_failed(format!("malformed offset: {}", offset.0)))?;

        sqlx::query("UPDATE job_queue SET status = 'done' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| JobLogError::commit_failed(err.to_string()))?;
        Ok(())
    }
}
