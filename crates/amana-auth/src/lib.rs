//! Token issuance and password hashing for Amana.
//!
//! This crate provides:
//! - HMAC-signed JWT encoding and decoding with role-bearing claims
//! - Short-lived access / long-lived refresh token pairs via [`TokenIssuer`]
//! - Argon2id password hashing with OWASP-recommended parameters
//!
//! Tokens are never persisted; validity is determined purely by signature
//! and expiry at verification time, compared against an injected clock.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use amana_auth::{TokenConfig, TokenIssuer};
//! use amana_core::{Role, SystemClock, UserId};
//!
//! let issuer = TokenIssuer::new(
//!     TokenConfig::new("a-long-random-secret"),
//!     Arc::new(SystemClock),
//! )?;
//!
//! let pair = issuer.issue(UserId::new(), "jdoe", Role::Viewer)?;
//! let claims = issuer.verify(&pair.access)?;
//! assert_eq!(claims.username, "jdoe");
//! ```

mod claims;
mod error;
mod issuer;
mod jwt;
mod password;

// Re-export public API
pub use claims::{TokenClaims, TokenType};
pub use error::AuthError;
pub use issuer::{TokenConfig, TokenIssuer, TokenPair};
pub use jwt::{decode_claims, encode_claims, signing_algorithm};
pub use password::PasswordHasher;
