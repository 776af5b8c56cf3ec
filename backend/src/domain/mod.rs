//! Domain primitives and the five dispatch-core components.
//!
//! Purpose: define strongly typed domain entities shared by the inbound and
//! outbound adapters, and the business logic for LLM dispatch, job
//! enrichment, the stream worker, résumé analysis, and vector matching.

pub mod enrichment;
pub mod error;
pub mod llm_dispatcher;
pub mod ports;
pub mod resume_analyzer;
pub mod stream_worker;
pub mod types;
pub mod vector_matcher;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::types::{
    CandidateMatch, EnrichedJob, MatchResult, RawJob, ResumeProfile, Seniority, SkillGap,
};

/// Convenient domain result alias.
pub type DomainResult<T> = Result<T, Error>;

/// HTTP header carrying the correlation id through to error responses.
pub const TRACE_ID_HEADER: &str = "x-trace-id";
