//! Résumé Analyzer (C4): turns extracted résumé text into a ranked list of
//! job matches, each optionally annotated with a skill gap. See §4.4.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::llm_dispatcher::{DispatchError, Dispatcher};
use crate::domain::ports::JobRepository;
use crate::domain::types::{MatchFilters, MatchResult, ResumeProfile, SkillGap};
use crate::domain::vector_matcher::VectorMatcher;

/// Per-request options (§4.4 operation signature), all independently
/// overridable by the caller.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub limit: usize,
    pub min_similarity: f32,
    pub include_gap: bool,
    pub gap_depth: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            min_similarity: 0.3,
            include_gap: true,
            gap_depth: 3,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyzerError {
    /// Malformed caller input; maps to HTTP 400.
    #[error("invalid input: {0}")]
    Input(String),
    /// The dispatcher exhausted its retry budget; maps to HTTP 429 with the
    /// fixed message required by §7.
    #[error("AI Analysis is busy. Please wait and try again.")]
    Busy,
    /// A non-rate-limit dispatcher failure; maps to HTTP 500.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The LLM output failed shape validation; maps to HTTP 500.
    #[error("parse failure: {0}")]
    Parse(String),
}

impl From<AnalyzerError> for crate::domain::Error {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Input(message) => Self::invalid_request(message),
            AnalyzerError::Busy => {
                Self::exhausted("AI Analysis is busy. Please wait and try again.")
            }
            AnalyzerError::Transport(message) => Self::internal(message),
            AnalyzerError::Parse(message) => Self::internal(message),
        }
    }
}

impl From<DispatchError> for AnalyzerError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Exhausted { .. } => Self::Busy,
            DispatchError::Transport { message } => Self::Transport(message),
            DispatchError::Parse { message } => Self::Parse(message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub profile: ResumeProfile,
    pub matches: Vec<MatchResult>,
    pub processing_time_ms: u64,
}

pub struct ResumeAnalyzer {
    dispatcher: Arc<Dispatcher>,
    matcher: Arc<VectorMatcher>,
    repository: Arc<dyn JobRepository>,
}

impl ResumeAnalyzer {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        matcher: Arc<VectorMatcher>,
        repository: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            dispatcher,
            matcher,
            repository,
        }
    }

    pub async fn analyze(
        &self,
        resume_text: &str,
        options: AnalysisOptions,
    ) -> Result<AnalysisResult, AnalyzerError> {
        if resume_text.trim().is_empty() {
            return Err(AnalyzerError::Input("résumé text must not be empty".into()));
        }

        let started = Instant::now();

        let profile: ResumeProfile = self
            .dispatcher
            .generate_structured(&profile_prompt(resume_text))
            .await?;

        let embedding_input = format!(
            "{}\n{}\n{}",
            profile.summary,
            profile.skills.join(", "),
            profile.job_titles.join(", ")
        );
        let query_vector = self.dispatcher.embed(&embedding_input).await?;

        let mut matches = self
            .matcher
            .rank(
                &query_vector,
                options.limit,
                options.min_similarity,
                &MatchFilters::default(),
            )
            .await
            .map_err(|err| AnalyzerError::Transport(err.to_string()))?;

        if options.include_gap {
            self.annotate_gaps(&profile, &mut matches, options.gap_depth)
                .await?;
        }

        Ok(AnalysisResult {
            profile,
            matches,
            processing_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Issue a single combined `GenerateStructured` call covering the first
    /// `min(gap_depth, matches.len())` matches and splice the returned gaps
    /// back in by position (§4.4 step 4).
    async fn annotate_gaps(
        &self,
        profile: &ResumeProfile,
        matches: &mut [MatchResult],
        gap_depth: usize,
    ) -> Result<(), AnalyzerError> {
        let depth = gap_depth.min(matches.len());
        if depth == 0 {
            return Ok(());
        }

        let mut job_skill_lists = Vec::with_capacity(depth);
        for m in &matches[..depth] {
            let skills = match self.repository.find(&m.job_id).await {
                Ok(Some(job)) => job.skills,
                Ok(None) => Vec::new(),
                Err(err) => return Err(AnalyzerError::Transport(err.to_string())),
            };
            job_skill_lists.push(skills);
        }

        let prompt = gap_prompt(profile, &job_skill_lists);
        let gaps: Vec<SkillGap> = self.dispatcher.generate_structured(&prompt).await?;

        for (m, gap) in matches[..depth].iter_mut().zip(gaps.into_iter()) {
            m.gap = Some(gap);
        }
        Ok(())
    }
}

fn profile_prompt(resume_text: &str) -> String {
    format!(
        "Extract a candidate profile from this résumé text. Respond with a \
         single JSON object with fields \"skills\" (array of strings), \
         \"experience_years\" (integer or null), \"summary\" (short text), \
         \"key_strengths\" (array of strings), \"education\" (text), and \
         \"job_titles\" (array of strings). Do not use markdown.\n\n{resume_text}"
    )
}

fn gap_prompt(profile: &ResumeProfile, job_skill_lists: &[Vec<String>]) -> String {
    let jobs_rendered = job_skill_lists
        .iter()
        .enumerate()
        .map(|(i, skills)| format!("{}. required skills: {}", i + 1, skills.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Candidate skills: {}\n\nFor each of the following jobs, in order, \
         identify missing skills, matching skills, and recommendations. \
         Respond with a single JSON array of objects with fields \"missing\", \
         \"matching\", and \"recommendations\" (all arrays of strings), one \
         object per job, in the same order.\n\n{jobs_rendered}",
        profile.skills.join(", ")
    )
}

#[cfg(test)]
mod tests;
