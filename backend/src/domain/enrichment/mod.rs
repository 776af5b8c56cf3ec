//! Enrichment Transform (C2): turns a `RawJob` into an `EnrichedJob` via two
//! sequential dispatcher calls. See §4.2.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;

use crate::domain::llm_dispatcher::{DispatchError, Dispatcher};
use crate::domain::types::{EnrichedJob, RawJob, Seniority};

const MAX_SKILLS: usize = 15;

#[derive(Debug, Deserialize)]
struct StructuredFields {
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    seniority: String,
    #[serde(default)]
    summary: String,
}

pub struct EnrichmentTransform {
    dispatcher: Arc<Dispatcher>,
    clock: Arc<dyn Clock>,
}

impl EnrichmentTransform {
    pub fn new(dispatcher: Arc<Dispatcher>, clock: Arc<dyn Clock>) -> Self {
        Self { dispatcher, clock }
    }

    /// Produce an `EnrichedJob` from `raw`. Propagates `DispatchError`
    /// unchanged on either LLM call; callers (C3) decide retry policy.
    pub async fn enrich(&self, raw: RawJob) -> Result<EnrichedJob, DispatchError> {
        let prompt = structured_prompt(&raw.position, &raw.description);
        let fields: StructuredFields = self.dispatcher.generate_structured(&prompt).await?;

        let skills = cap_and_dedup_skills(fields.skills);
        let seniority = Seniority::normalize(&fields.seniority);
        let summary = fields.summary;

        let embedding_input = embedding_input(&raw.position, &summary, &skills);
        let embedding = self.dispatcher.embed(&embedding_input).await?;

        Ok(EnrichedJob {
            id: raw.id,
            company: raw.company,
            position: raw.position,
            location: raw.location,
            url: raw.url,
            tags: raw.tags,
            description: raw.description,
            skills,
            seniority,
            summary,
            embedding,
            created_at: self.clock.now(),
        })
    }
}

fn structured_prompt(position: &str, description: &str) -> String {
    format!(
        "Extract structured information from this job posting. Respond with a \
         single JSON object with fields \"skills\" (array of strings), \
         \"seniority\" (one of Junior, Mid, Senior, Lead), and \"summary\" \
         (a short plain-text summary). Do not use markdown or any text outside \
         the JSON object.\n\nPosition: {position}\nDescription: {description}"
    )
}

fn embedding_input(position: &str, summary: &str, skills: &[String]) -> String {
    format!("{position}\n{summary}\nSkills: {}", skills.join(", "))
}

/// Cap at [`MAX_SKILLS`], deduplicating case-insensitively while preserving
/// the first occurrence's original casing (§4.2 step 2).
fn cap_and_dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.insert(key) {
            deduped.push(trimmed.to_string());
        }
        if deduped.len() == MAX_SKILLS {
            break;
        }
    }
    deduped
}
