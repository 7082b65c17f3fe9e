//! Token claims carried by issued credentials.
//!
//! Every token embeds the subject's identity reference, username, and role
//! alongside the standard `iat`/`exp`/`jti` claims, plus a type
//! discriminator separating short-lived access tokens from long-lived
//! refresh tokens.

use amana_core::{ParseIdError, Role, UserId};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Discriminates access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived credential presented on every request.
    Access,
    /// Long-lived credential exchanged for a fresh pair.
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Decoded payload of a verified credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the user's identity reference.
    pub sub: String,

    /// Username at issuance time.
    pub username: String,

    /// Role at issuance time.
    pub role: Role,

    /// Issued at as Unix timestamp.
    pub iat: i64,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Unique identifier for this token.
    pub jti: String,

    /// Token type discriminator.
    pub typ: TokenType,
}

impl TokenClaims {
    /// Build claims for a subject, valid from `issued_at` for `lifetime`.
    #[must_use]
    pub fn new(
        subject: UserId,
        username: impl Into<String>,
        role: Role,
        typ: TokenType,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            username: username.into(),
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
            typ,
        }
    }

    /// Parse the subject claim back into a typed identifier.
    pub fn subject(&self) -> Result<UserId, ParseIdError> {
        self.sub.parse()
    }

    /// The expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether this token is expired when checked at `now`.
    ///
    /// A token is valid strictly before its expiry instant; there is no
    /// clock-skew grace period.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
