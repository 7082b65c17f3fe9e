//! Error types for the authorization gate.

use amana_auth::AuthError;
use amana_core::Role;
use amana_identity::StoreError;
use thiserror::Error;

/// Authorization errors.
///
/// `Unauthorized` covers every credential problem (bad signature, expiry,
/// unknown or inactive subject); the surrounding HTTP layer maps it to
/// 401. `Forbidden` means a valid identity lacks the required role (403).
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The presented credential does not resolve to a live identity.
    #[error("Unauthorized{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthorized {
        /// Optional internal context; never derived from which check failed
        /// in a way that leaks account existence.
        message: Option<String>,
    },

    /// Valid identity, insufficient role.
    #[error("Forbidden: this action requires one of {required:?}")]
    Forbidden {
        /// The roles that would have been accepted.
        required: Vec<Role>,
    },

    /// Minting a replacement token pair failed.
    #[error("Token issuance failed: {0}")]
    Issue(#[source] AuthError),

    /// The user store is unavailable: a systemic outage, distinct from any
    /// credential problem.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthzError {
    /// Unauthorized with context.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: Some(message.into()),
        }
    }

    /// Check if this is a credential failure (HTTP 401).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthzError::Unauthorized { .. })
    }

    /// Check if this is a role failure (HTTP 403).
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthzError::Forbidden { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_message() {
        let err = AuthzError::Unauthorized { message: None };
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[test]
    fn test_display_with_message() {
        let err = AuthzError::unauthorized("invalid or expired token");
        assert_eq!(err.to_string(), "Unauthorized: invalid or expired token");
    }

    #[test]
    fn test_forbidden_names_required_roles() {
        let err = AuthzError::Forbidden {
            required: vec![Role::Admin, Role::RiskOfficer],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("Forbidden"));
        assert!(rendered.contains("Admin"));
        assert!(rendered.contains("RiskOfficer"));
    }

    #[test]
    fn test_predicates() {
        assert!(AuthzError::unauthorized("x").is_unauthorized());
        assert!(!AuthzError::unauthorized("x").is_forbidden());

        let forbidden = AuthzError::Forbidden {
            required: vec![Role::Admin],
        };
        assert!(forbidden.is_forbidden());
        assert!(!forbidden.is_unauthorized());
    }
}
