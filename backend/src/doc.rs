//! OpenAPI documentation configuration.
//!
//! Registers the résumé analysis endpoint and health probes. Domain types
//! derive [`utoipa::ToSchema`] directly, so no wrapper schema layer is
//! needed here. The generated specification is used by Swagger UI (debug
//! builds) and exported via `cargo run --bin openapi-dump` for external
//! tooling.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::domain::types::{MatchResult, ResumeProfile, Seniority, SkillGap};
use crate::inbound::http::resume::{ResumeAnalysisRequest, ResumeAnalysisResponse};

/// OpenAPI document for the résumé analysis REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Résumé dispatch core API",
        description = "HTTP interface for résumé analysis and health probes.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::resume::analyze_resume,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ResumeAnalysisRequest,
        ResumeAnalysisResponse,
        ResumeProfile,
        MatchResult,
        SkillGap,
        Seniority,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "resume", description = "Résumé analysis"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
