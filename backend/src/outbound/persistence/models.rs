//! Row types mapping between [`EnrichedJob`] and the `enriched_jobs` table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::types::{EnrichedJob, Seniority};

use super::schema::enriched_jobs;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = enriched_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EnrichedJobRow {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub url: String,
    pub tags: Vec<String>,
    pub description: String,
    pub skills: Vec<String>,
    pub seniority: String,
    pub summary: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = enriched_jobs)]
pub struct NewEnrichedJobRow<'a> {
    pub id: &'a str,
    pub company: &'a str,
    pub position: &'a str,
    pub location: &'a str,
    pub url: &'a str,
    pub tags: &'a [String],
    pub description: &'a str,
    pub skills: &'a [String],
    pub seniority: &'a str,
    pub summary: &'a str,
    pub embedding: &'a [f32],
    pub created_at: DateTime<Utc>,
}

pub fn seniority_to_column(seniority: Seniority) -> &'static str {
    match seniority {
        Seniority::Junior => "junior",
        Seniority::Mid => "mid",
        Seniority::Senior => "senior",
        Seniority::Lead => "lead",
    }
}

impl From<EnrichedJobRow> for EnrichedJob {
    fn from(row: EnrichedJobRow) -> Self {
        Self {
            id: row.id,
            company: row.company,
            position: row.position,
            location: row.location,
            url: row.url,
            tags: row.tags,
            description: row.description,
            skills: row.skills,
            seniority: Seniority::normalize(&row.seniority),
            summary: row.summary,
            embedding: row.embedding,
            created_at: row.created_at,
        }
    }
}
