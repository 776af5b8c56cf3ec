//! Résumé analysis endpoint (C4).
//!
//! ```text
//! POST /api/v1/resume-analysis
//! ```
//!
//! Accepts already-extracted résumé text (PDF extraction is an upstream
//! collaborator's concern, not this core's) plus the per-request knobs
//! described in §4.4, and returns a ranked list of job matches.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::resume_analyzer::AnalysisOptions;
use crate::domain::types::{MatchResult, ResumeProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

fn default_limit() -> usize {
    AnalysisOptions::default().limit
}

fn default_min_similarity() -> f32 {
    AnalysisOptions::default().min_similarity
}

fn default_include_gap() -> bool {
    AnalysisOptions::default().include_gap
}

fn default_gap_depth() -> usize {
    AnalysisOptions::default().gap_depth
}

/// Request body for résumé analysis.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysisRequest {
    /// Extracted, plain-text résumé content.
    pub resume_text: String,
    /// Top-k jobs to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Minimum cosine similarity for a match to be returned.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    /// Whether to annotate the top `gap_depth` matches with a skill gap.
    #[serde(default = "default_include_gap")]
    pub include_gap: bool,
    /// How many of the top matches to annotate with a skill gap.
    #[serde(default = "default_gap_depth")]
    pub gap_depth: usize,
}

impl From<&ResumeAnalysisRequest> for AnalysisOptions {
    fn from(request: &ResumeAnalysisRequest) -> Self {
        Self {
            limit: request.limit,
            min_similarity: request.min_similarity,
            include_gap: request.include_gap,
            gap_depth: request.gap_depth,
        }
    }
}

/// Response body for résumé analysis.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysisResponse {
    pub profile: ResumeProfile,
    pub matches: Vec<MatchResult>,
    pub processing_time_ms: u64,
}

/// Analyze a résumé against persisted job postings.
#[utoipa::path(
    post,
    path = "/api/v1/resume-analysis",
    request_body = ResumeAnalysisRequest,
    responses(
        (status = 200, description = "Ranked job matches", body = ResumeAnalysisResponse),
        (status = 400, description = "Malformed input"),
        (status = 429, description = "Dispatcher exhausted; retry later"),
        (status = 500, description = "Unexpected error")
    ),
    tags = ["resume"],
    operation_id = "analyzeResume"
)]
#[post("/resume-analysis")]
pub async fn analyze_resume(
    state: web::Data<HttpState>,
    body: web::Json<ResumeAnalysisRequest>,
) -> ApiResult<HttpResponse> {
    let options = AnalysisOptions::from(&body.0);
    let result = state
        .resume_analyzer
        .analyze(&body.resume_text, options)
        .await?;

    Ok(HttpResponse::Ok().json(ResumeAnalysisResponse {
        profile: result.profile,
        matches: result.matches,
        processing_time_ms: result.processing_time_ms,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockJobRepository, MockLlmClient};
    use crate::domain::resume_analyzer::ResumeAnalyzer;
    use crate::domain::vector_matcher::VectorMatcher;
    use actix_web::{App, test};
    use std::sync::Arc;

    fn build_state() -> web::Data<HttpState> {
        let client = Arc::new(MockLlmClient::new());
        let dispatcher = Arc::new(crate::domain::llm_dispatcher::Dispatcher::new(
            crate::domain::llm_dispatcher::DispatcherConfig::new(
                vec!["key-a".to_string()],
                "gen-model",
                "embed-model",
            )
            .expect("non-empty credentials"),
            client,
            Arc::new(crate::domain::ports::NoOpDispatcherMetrics),
            Arc::new(mockable::DefaultClock),
            Arc::new(crate::domain::llm_dispatcher::TokioSleeper),
        ));
        let repository = Arc::new(MockJobRepository::new());
        let matcher = Arc::new(VectorMatcher::new(
            repository.clone(),
            Arc::new(crate::domain::ports::NoOpMatcherMetrics),
            768,
        ));
        let resume_analyzer = Arc::new(ResumeAnalyzer::new(dispatcher, matcher, repository));
        web::Data::new(HttpState { resume_analyzer })
    }

    #[actix_web::test]
    async fn rejects_empty_resume_text_with_400() {
        let app = test::init_service(
            App::new()
                .app_data(build_state())
                .service(analyze_resume),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/resume-analysis")
            .set_json(ResumeAnalysisRequest {
                resume_text: "   ".to_string(),
                limit: 5,
                min_similarity: 0.3,
                include_gap: true,
                gap_depth: 3,
            })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 400);
    }
}
