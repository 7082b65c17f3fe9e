//! Error types for directory operations.
//!
//! All of these are absorbed by the identity resolver and converted into a
//! fall-through to local authentication; they never reach the login caller.

use thiserror::Error;

/// Directory operation errors.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// Could not reach or negotiate with the directory server.
    #[error("Directory connection failed: {message}")]
    ConnectionFailed { message: String },

    /// A service-account or protocol-level bind failure (not a credential
    /// rejection, which `bind` reports as `Ok(false)`).
    #[error("Directory bind failed with code {code}: {message}")]
    BindFailed { code: u32, message: String },

    /// Search request failed.
    #[error("Directory search failed: {message}")]
    SearchFailed { message: String },

    /// Configuration is invalid.
    #[error("Invalid directory configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl DirectoryError {
    /// Connection failure with a formatted message.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Search failure with a formatted message.
    pub fn search_failed(message: impl Into<String>) -> Self {
        Self::SearchFailed {
            message: message.into(),
        }
    }

    /// Configuration failure with a formatted message.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result alias for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
