//! Core data model shared by the enrichment, matching, and analysis
//! components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A job posting as received from the durable log, before enrichment.
///
/// Immutable once received; all fields come from the upstream producer
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawJob {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub url: String,
    pub tags: Vec<String>,
    pub description: String,
}

/// Seniority as normalized by the enrichment transform.
///
/// Any LLM output outside this closed set is mapped to [`Seniority::Mid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl Seniority {
    /// Normalize a free-form LLM string into the closed set, defaulting to
    /// [`Seniority::Mid`] for anything unrecognized (including empty input).
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "junior" => Self::Junior,
            "mid" | "mid-level" | "intermediate" => Self::Mid,
            "senior" => Self::Senior,
            "lead" | "staff" | "principal" => Self::Lead,
            _ => Self::Mid,
        }
    }
}

/// The persisted, enriched form of a [`RawJob`].
///
/// ## Invariants
/// - `embedding.len() == dimensionality used at write time` (checked by C2
///   against the dispatcher's configured `D` before construction).
/// - `skills` is deduplicated case-insensitively and capped at 15 entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrichedJob {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub url: String,
    pub tags: Vec<String>,
    pub description: String,
    pub skills: Vec<String>,
    pub seniority: Seniority,
    pub summary: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// A candidate's profile as extracted from résumé text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResumeProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub job_titles: Vec<String>,
}

/// Missing/matching skills and recommendations for one job match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkillGap {
    pub missing: Vec<String>,
    pub matching: Vec<String>,
    pub recommendations: Vec<String>,
}

/// A candidate row returned by the storage collaborator for ranking: the
/// minimum a similarity query needs without loading the full [`EnrichedJob`].
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch {
    pub id: String,
    pub embedding: Vec<f32>,
    pub seniority: Seniority,
    pub skills: Vec<String>,
}

/// One ranked job, optionally annotated with a skill gap against a résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchResult {
    pub job_id: String,
    pub similarity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<SkillGap>,
}

/// Optional filters applied by [`crate::domain::vector_matcher`] before
/// ranking candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilters {
    pub seniority: Option<Seniority>,
    pub required_skills: Vec<String>,
}

/// Stable identifier for a dispatcher credential slot, used only in logs and
/// metrics labels — never the credential token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(pub usize);

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// Opaque identifier correlating a résumé-analysis request across logs.
pub type RequestId = Uuid;
