//! Process-wide configuration assembly (§6 Configuration surface).

pub mod config;

pub use config::{ServerConfig, ServerConfigError};
