//! Token issuance.
//!
//! [`TokenIssuer`] mints signed access/refresh pairs for an authenticated
//! identity and verifies presented tokens. Issuance and verification share
//! a [`TokenConfig`] passed in at construction; there is no process-wide
//! token state.

use crate::claims::{TokenClaims, TokenType};
use crate::error::AuthError;
use crate::jwt::{decode_claims, encode_claims, signing_algorithm};
use amana_core::config::{env_or, parse_env_or, require_env};
use amana_core::{Clock, ConfigError, Role, UserId};
use chrono::Duration;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::sync::Arc;

/// Default access-token lifetime in minutes.
const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;

/// Default refresh-token lifetime in days.
const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Token signing and lifetime configuration.
#[derive(Clone, Deserialize)]
pub struct TokenConfig {
    /// HMAC signing secret.
    pub secret: String,

    /// Signing algorithm name (HS256, HS384, or HS512).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Access-token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,

    /// Refresh-token lifetime in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: i64,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_ttl() -> i64 {
    DEFAULT_ACCESS_TTL_MINUTES
}

fn default_refresh_ttl() -> i64 {
    DEFAULT_REFRESH_TTL_DAYS
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"***REDACTED***")
            .field("algorithm", &self.algorithm)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish()
    }
}

impl TokenConfig {
    /// Create a config with the given secret and default lifetimes.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: default_algorithm(),
            access_ttl_minutes: DEFAULT_ACCESS_TTL_MINUTES,
            refresh_ttl_days: DEFAULT_REFRESH_TTL_DAYS,
        }
    }

    /// Set the signing algorithm name.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Set the access-token lifetime in minutes.
    #[must_use]
    pub fn with_access_ttl_minutes(mut self, minutes: i64) -> Self {
        self.access_ttl_minutes = minutes;
        self
    }

    /// Set the refresh-token lifetime in days.
    #[must_use]
    pub fn with_refresh_ttl_days(mut self, days: i64) -> Self {
        self.refresh_ttl_days = days;
        self
    }

    /// Load from environment variables.
    ///
    /// # Required Variables
    ///
    /// - `JWT_SECRET_KEY` - HMAC signing secret
    ///
    /// # Optional Variables
    ///
    /// - `JWT_ALGORITHM` - default: "HS256"
    /// - `JWT_ACCESS_TOKEN_EXPIRE_MINUTES` - default: 15
    /// - `JWT_REFRESH_TOKEN_EXPIRE_DAYS` - default: 7
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: require_env("JWT_SECRET_KEY")?,
            algorithm: env_or("JWT_ALGORITHM", "HS256"),
            access_ttl_minutes: parse_env_or(
                "JWT_ACCESS_TOKEN_EXPIRE_MINUTES",
                DEFAULT_ACCESS_TTL_MINUTES,
            )?,
            refresh_ttl_days: parse_env_or("JWT_REFRESH_TOKEN_EXPIRE_DAYS", DEFAULT_REFRESH_TTL_DAYS)?,
        })
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfiguration` for an empty secret or
    /// non-positive lifetime, `AuthError::InvalidAlgorithm` for an
    /// unsupported algorithm name.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "signing secret must not be empty".to_string(),
            ));
        }
        if self.secret.len() < 32 {
            tracing::warn!("JWT signing secret is shorter than 32 bytes");
        }
        if self.access_ttl_minutes <= 0 {
            return Err(AuthError::InvalidConfiguration(
                "access token lifetime must be positive".to_string(),
            ));
        }
        if self.refresh_ttl_days <= 0 {
            return Err(AuthError::InvalidConfiguration(
                "refresh token lifetime must be positive".to_string(),
            ));
        }
        signing_algorithm(&self.algorithm)?;
        Ok(())
    }
}

/// An access/refresh credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: String,
    /// Long-lived refresh token.
    pub refresh: String,
}

/// Issues and verifies signed, time-bounded credentials.
#[derive(Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
    algorithm: Algorithm,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer from a validated configuration and a clock.
    ///
    /// # Errors
    ///
    /// Returns the validation error if the configuration is unusable.
    pub fn new(config: TokenConfig, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        config.validate()?;
        let algorithm = signing_algorithm(&config.algorithm)?;

        Ok(Self {
            config,
            algorithm,
            clock,
        })
    }

    /// Mint an access/refresh pair for an authenticated identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if encoding fails.
    pub fn issue(
        &self,
        subject: UserId,
        username: &str,
        role: Role,
    ) -> Result<TokenPair, AuthError> {
        let now = self.clock.now();

        let access_claims = TokenClaims::new(
            subject,
            username,
            role,
            TokenType::Access,
            now,
            Duration::minutes(self.config.access_ttl_minutes),
        );
        let refresh_claims = TokenClaims::new(
            subject,
            username,
            role,
            TokenType::Refresh,
            now,
            Duration::days(self.config.refresh_ttl_days),
        );

        let pair = TokenPair {
            access: encode_claims(&access_claims, self.config.secret.as_bytes(), self.algorithm)?,
            refresh: encode_claims(&refresh_claims, self.config.secret.as_bytes(), self.algorithm)?,
        };

        tracing::debug!(user_id = %subject, username = %username, "Issued token pair");
        Ok(pair)
    }

    /// Verify a presented token and return its claims.
    ///
    /// Stateless and side-effect-free; expiry is compared against the
    /// injected clock at call time.
    ///
    /// # Errors
    ///
    /// Any signature, format, or expiry failure from
    /// [`decode_claims`](crate::decode_claims).
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode_claims(
            token,
            self.config.secret.as_bytes(),
            self.algorithm,
            self.clock.now(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amana_core::FixedClock;
    use chrono::{TimeZone, Utc};

    const SECRET: &str = "issuer-test-signing-secret-0123456789ab";

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn issuer_with_clock(clock: Arc<FixedClock>) -> TokenIssuer {
        TokenIssuer::new(TokenConfig::new(SECRET), clock).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = TokenConfig::new(SECRET);
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.access_ttl_minutes, 15);
        assert_eq!(config.refresh_ttl_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_empty_secret() {
        let config = TokenConfig::new("");
        assert!(matches!(
            config.validate(),
            Err(AuthError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_rejects_bad_algorithm() {
        let config = TokenConfig::new(SECRET).with_algorithm("RS256");
        assert!(matches!(
            config.validate(),
            Err(AuthError::InvalidAlgorithm(_))
        ));
    }

    #[test]
    fn test_config_rejects_non_positive_lifetimes() {
        let config = TokenConfig::new(SECRET).with_access_ttl_minutes(0);
        assert!(config.validate().is_err());

        let config = TokenConfig::new(SECRET).with_refresh_ttl_days(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = TokenConfig::new(SECRET);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("***REDACTED***"));
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let issuer = issuer_with_clock(fixed_clock());
        let subject = UserId::new();

        let pair = issuer.issue(subject, "jdoe", Role::Viewer).unwrap();
        let claims = issuer.verify(&pair.access).unwrap();

        assert_eq!(claims.subject().unwrap(), subject);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role, Role::Viewer);
        assert_eq!(claims.typ, TokenType::Access);
    }

    #[test]
    fn test_refresh_token_carries_type_and_lifetime() {
        let issuer = issuer_with_clock(fixed_clock());

        let pair = issuer.issue(UserId::new(), "jdoe", Role::Admin).unwrap();
        let claims = issuer.verify(&pair.refresh).unwrap();

        assert_eq!(claims.typ, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_access_token_expires_after_lifetime() {
        let clock = fixed_clock();
        let issuer = issuer_with_clock(clock.clone());

        let pair = issuer.issue(UserId::new(), "jdoe", Role::Viewer).unwrap();
        assert!(issuer.verify(&pair.access).is_ok());

        clock.advance(Duration::minutes(15));
        let result = issuer.verify(&pair.access);
        assert!(matches!(result, Err(AuthError::TokenExpired)));

        // The refresh token outlives the access token.
        assert!(issuer.verify(&pair.refresh).is_ok());
    }

    #[test]
    fn test_refresh_token_expires_after_lifetime() {
        let clock = fixed_clock();
        let issuer = issuer_with_clock(clock.clone());

        let pair = issuer.issue(UserId::new(), "jdoe", Role::Viewer).unwrap();

        clock.advance(Duration::days(7));
        let result = issuer.verify(&pair.refresh);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_custom_lifetimes() {
        let clock = fixed_clock();
        let config = TokenConfig::new(SECRET)
            .with_access_ttl_minutes(1)
            .with_refresh_ttl_days(1);
        let issuer = TokenIssuer::new(config, clock.clone()).unwrap();

        let pair = issuer.issue(UserId::new(), "jdoe", Role::Viewer).unwrap();

        clock.advance(Duration::seconds(61));
        assert!(issuer.verify(&pair.access).is_err());
        assert!(issuer.verify(&pair.refresh).is_ok());
    }

    #[test]
    fn test_verify_rejects_token_from_other_secret() {
        let issuer = issuer_with_clock(fixed_clock());
        let other = TokenIssuer::new(
            TokenConfig::new("some-other-secret-of-sufficient-len"),
            fixed_clock(),
        )
        .unwrap();

        let pair = other.issue(UserId::new(), "jdoe", Role::Viewer).unwrap();
        assert!(matches!(
            issuer.verify(&pair.access),
            Err(AuthError::InvalidSignature)
        ));
    }
}
