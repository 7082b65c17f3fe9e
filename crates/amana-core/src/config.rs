//! Configuration loading support.
//!
//! Components receive explicit configuration values through their
//! constructors; there is no process-wide settings singleton. The helpers
//! here back each config type's `from_env()` with fail-fast errors.

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Read a required environment variable.
pub fn require_env(var: &str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::MissingVar(var.to_string()))
}

/// Read an optional environment variable, falling back to a default.
#[must_use]
pub fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to a default.
///
/// A present-but-unparseable value is an error rather than a silent
/// fallback.
pub fn parse_env_or<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("{e}"),
        }),
        Err(_) => Ok(default),
    }
}
