//! Error types for identity resolution.

use crate::store::StoreError;
use amana_auth::AuthError;
use thiserror::Error;

/// Identity resolution and provisioning errors.
///
/// `AuthenticationFailed` is deliberately undifferentiated: the caller
/// cannot tell a wrong password from an unknown user or an unreachable
/// directory, so a login response leaks nothing about which path failed.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Neither the directory nor the local store accepted the credentials.
    #[error("Invalid username or password")]
    AuthenticationFailed,

    /// A local account with this username already exists.
    #[error("Username already exists: {0}")]
    UsernameExists(String),

    /// An account with this email already exists.
    #[error("Email already registered: {0}")]
    EmailExists(String),

    /// Password hashing or verification infrastructure failed.
    #[error("Password processing failed: {0}")]
    Password(#[from] AuthError),

    /// The user store itself is unavailable. Unlike authentication
    /// failures, this propagates: it signals a systemic outage, not a
    /// credentials problem.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IdentityError {
    /// Check whether this is the undifferentiated credentials failure.
    #[must_use]
    pub fn is_authentication_failed(&self) -> bool {
        matches!(self, IdentityError::AuthenticationFailed)
    }
}
