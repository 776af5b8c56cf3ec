//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain use-case and remain testable without I/O.

use std::sync::Arc;

use crate::domain::resume_analyzer::ResumeAnalyzer;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub resume_analyzer: Arc<ResumeAnalyzer>,
}
