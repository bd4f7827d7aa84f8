//! Shared utilities for tw-advisor
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup, TOML configuration loading, and secret lookup.

pub mod config;
pub mod logging;
pub mod secrets;

pub use config::{ConfigError, Result, load_toml, load_toml_or_default};
pub use logging::{LogTarget, init_tracing};
pub use secrets::{GEMINI_API_KEY, SecretStore};
