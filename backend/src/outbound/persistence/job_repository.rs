//! Diesel-backed implementation of [`JobRepository`], the storage
//! collaborator consumed by the stream worker and the vector matcher.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{JobRepository, JobRepositoryError};
use crate::domain::types::{CandidateMatch, EnrichedJob, MatchFilters};

use super::models::{seniority_to_column, EnrichedJobRow, NewEnrichedJobRow};
use super::pool::DbPool;
use super::schema::enriched_jobs;

pub struct DieselJobRepository {
    pool: DbPool,
}

impl DieselJobRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(err: impl std::fmt::Display) -> JobRepositoryError {
    JobRepositoryError::connection(err.to_string())
}

#[async_trait]
impl JobRepository for DieselJobRepository {
    async fn upsert(&self, job: EnrichedJob) -> Result<(), JobRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let seniority_str = seniority_to_column(job.seniority);
        let row = NewEnrichedJobRow {
            id: &job.id,
            company: &job.company,
            position: &job.position,
            location: &job.location,
            url: &job.url,
            tags: &job.tags,
            description: &job.description,
            skills: &job.skills,
            seniority: seniority_str,
            summary: &job.summary,
            embedding: &job.embedding,
            created_at: job.created_at,
        };

        diesel::insert_into(enriched_jobs::table)
            .values(&row)
            .on_conflict(enriched_jobs::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| JobRepositoryError::write(err.to_string()))?;
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<EnrichedJob>, JobRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = enriched_jobs::table
            .find(id.to_string())
            .select(EnrichedJobRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| JobRepositoryError::query(err.to_string()))?;
        Ok(row.map(EnrichedJob::from))
    }

    async fn query_candidates(
        &self,
        filters: &MatchFilters,
    ) -> Result<Vec<CandidateMatch>, JobRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = enriched_jobs::table.select(EnrichedJobRow::as_select()).into_boxed();
        if let Some(seniority) = filters.seniority {
            query = query.filter(enriched_jobs::seniority.eq(seniority_to_column(seniority)));
        }

        let rows: Vec<EnrichedJobRow> = query
            .load(&mut conn)
            .await
            .map_err(|err| JobRepositoryError::query(err.to_string()))?;

        let candidates = rows
            .into_iter()
            .filter(|row| {
                filters
                    .required_skills
                    .iter()
                    .all(|required| row.skills.iter().any(|s| s.eq_ignore_ascii_case(required)))
            })
            .map(|row| CandidateMatch {
                id: row.id,
                embedding: row.embedding,
                seniority: crate::domain::types::Seniority::normalize(&row.seniority),
                skills: row.skills,
            })
            .collect();

        Ok(candidates)
    }
}
