//! Actix middleware shared across the HTTP surface.

mod trace;

pub use trace::Trace;
