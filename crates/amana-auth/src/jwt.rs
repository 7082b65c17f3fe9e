//! JWT encoding and decoding with HMAC signatures.
//!
//! Signing uses a shared secret with a configurable HMAC algorithm
//! (HS256 by default). Expiry is not delegated to the JWT library: the
//! decoded `exp` claim is compared against a caller-supplied instant so
//! that verification is testable at simulated times and carries no
//! clock-skew leeway.

use crate::claims::TokenClaims;
use crate::error::AuthError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};

/// Resolve a configured algorithm name, restricted to the HMAC family.
pub fn signing_algorithm(name: &str) -> Result<Algorithm, AuthError> {
    match name {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(AuthError::InvalidAlgorithm(other.to_string())),
    }
}

/// Encode claims into a signed token string.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if encoding fails.
pub fn encode_claims(
    claims: &TokenClaims,
    secret: &[u8],
    algorithm: Algorithm,
) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret);
    let header = Header::new(algorithm);

    encode(&header, claims, &key).map_err(|e| AuthError::InvalidToken(format!("Encoding failed: {e}")))
}

/// Decode and validate a token, checking expiry against `now`.
///
/// # Errors
///
/// - `AuthError::TokenExpired` - `now` is at or past the token's expiry
/// - `AuthError::InvalidSignature` - signature verification failed
/// - `AuthError::InvalidToken` - token format is invalid
/// - `AuthError::InvalidAlgorithm` - token header names a different algorithm
pub fn decode_claims(
    token: &str,
    secret: &[u8],
    algorithm: Algorithm,
    now: DateTime<Utc>,
) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret);

    let mut validation = Validation::new(algorithm);
    validation.algorithms = vec![algorithm];
    // No audience claim is issued.
    validation.validate_aud = false;
    // Expiry is checked below against the injected instant, with no leeway.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.required_spec_claims.clear();

    let token_data: TokenData<TokenClaims> =
        decode(token, &key, &validation).map_err(map_jwt_error)?;

    if token_data.claims.is_expired_at(now) {
        return Err(AuthError::TokenExpired);
    }

    Ok(token_data.claims)
}

/// Map jsonwebtoken errors to `AuthError`.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => {
            AuthError::InvalidAlgorithm("token header algorithm mismatch".to_string())
        }
        ErrorKind::InvalidToken => AuthError::InvalidToken("Malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::InvalidToken("Invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::InvalidToken("Invalid JSON in claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.to_string()),
        _ => AuthError::InvalidToken(format!("Token validation failed: {err}")),
    }
}
