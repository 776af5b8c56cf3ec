#![cfg_attr(
    test,
    expect(clippy::expect_used, reason = "tests require contextual panics")
)]
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
//! Job-recommendation dispatch core.
//!
//! The crate is organised hexagonally: [`domain`] holds the five dispatch
//! components (§2 of the design) and the ports they depend on, [`inbound`]
//! and [`outbound`] hold the adapters translating those ports to and from
//! HTTP, Postgres, Redis, and the injected LLM provider, and [`server`]
//! assembles process configuration from the environment.

pub mod doc;
pub mod domain;
pub mod inbound;
mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;

/// Public OpenAPI surface used by Swagger UI and the `openapi-dump` binary.
pub use doc::ApiDoc;
