//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits for various infrastructure concerns:
//!
//! - **llm**: reqwest-backed client speaking an OpenAI-compatible surface
//! - **persistence**: PostgreSQL-backed job repository using Diesel
//! - **cache**: Redis-backed best-effort job cache
//! - **queue**: Postgres-backed durable job log
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod llm;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod queue;
