//! Error types for token and password operations.

use thiserror::Error;

/// Authentication primitive errors.
///
/// Token variants are deliberately terminal: a failed verification is
/// reported to the caller immediately, never retried.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Token errors
    /// Token has expired (exp claim is at or before the verification time).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature is invalid.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token format is malformed or invalid.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token or configuration names an algorithm outside the HMAC family.
    #[error("Unsupported algorithm: {0}")]
    InvalidAlgorithm(String),

    /// Required claim is missing from token.
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Issuer configuration is invalid (empty secret, bad lifetime).
    #[error("Invalid token configuration: {0}")]
    InvalidConfiguration(String),

    // Password errors
    /// Password hashing operation failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored password hash is not in PHC format.
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

impl AuthError {
    /// Check if this error indicates an expired token.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Check if this error is related to token verification.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired
                | AuthError::InvalidSignature
                | AuthError::InvalidToken(_)
                | AuthError::InvalidAlgorithm(_)
                | AuthError::MissingClaim(_)
        )
    }

    /// Check if this error is related to password operations.
    #[must_use]
    pub fn is_password_error(&self) -> bool {
        matches!(
            self,
            AuthError::HashingFailed(_) | AuthError::InvalidHashFormat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::TokenExpired.to_string(), "Token has expired");
        assert_eq!(
            AuthError::InvalidSignature.to_string(),
            "Invalid token signature"
        );
        assert_eq!(
            AuthError::InvalidToken("malformed base64".to_string()).to_string(),
            "Invalid token: malformed base64"
        );
        assert_eq!(
            AuthError::InvalidAlgorithm("RS256".to_string()).to_string(),
            "Unsupported algorithm: RS256"
        );
    }

    #[test]
    fn test_is_expired() {
        assert!(AuthError::TokenExpired.is_expired());
        assert!(!AuthError::InvalidSignature.is_expired());
    }

    #[test]
    fn test_is_token_error() {
        assert!(AuthError::TokenExpired.is_token_error());
        assert!(AuthError::InvalidSignature.is_token_error());
        assert!(AuthError::MissingClaim("sub".to_string()).is_token_error());

        assert!(!AuthError::HashingFailed("oom".to_string()).is_token_error());
        assert!(!AuthError::InvalidConfiguration("empty secret".to_string()).is_token_error());
    }

    #[test]
    fn test_is_password_error() {
        assert!(AuthError::HashingFailed("oom".to_string()).is_password_error());
        assert!(AuthError::InvalidHashFormat.is_password_error());

        assert!(!AuthError::TokenExpired.is_password_error());
    }
}
