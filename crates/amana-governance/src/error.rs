//! Error types for governance operations.

use thiserror::Error;

/// Governance errors.
#[derive(Debug, Clone, Error)]
pub enum GovernanceError {
    /// Input validation failure.
    #[error("Validation error on field '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: &'static str,
        /// Description of the failure.
        message: String,
    },
}

impl GovernanceError {
    /// Validation failure for a named field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_field_and_message() {
        let err = GovernanceError::validation("impact", "must be between 1 and 5");
        assert_eq!(
            err.to_string(),
            "Validation error on field 'impact': must be between 1 and 5"
        );
    }
}
