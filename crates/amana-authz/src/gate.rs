//! The authenticate/authorize pipeline.

use crate::error::AuthzError;
use amana_auth::{TokenIssuer, TokenPair, TokenType};
use amana_core::Role;
use amana_identity::{User, UserStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Validates presented credentials and enforces role membership.
pub struct AuthorizationGate {
    issuer: TokenIssuer,
    store: Arc<dyn UserStore>,
}

impl AuthorizationGate {
    /// Create a gate over the issuer's verification half and the user store.
    pub fn new(issuer: TokenIssuer, store: Arc<dyn UserStore>) -> Self {
        Self { issuer, store }
    }

    /// Resolve a presented token to a live user record.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the token fails verification, its subject does
    /// not resolve to an existing user, or the user is deactivated.
    /// `Store` when the user store is unreachable.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthzError> {
        let claims = self.issuer.verify(token).map_err(|e| {
            debug!(error = %e, "Token verification failed");
            AuthzError::unauthorized("Invalid or expired token")
        })?;

        let subject = claims.subject().map_err(|e| {
            debug!(error = %e, "Token subject is not a valid user id");
            AuthzError::unauthorized("Invalid token payload")
        })?;

        let user = self
            .store
            .find_by_id(subject)
            .await?
            .ok_or_else(|| AuthzError::unauthorized("User not found"))?;

        if !user.is_active {
            warn!(user_id = %user.id, "Authenticated token for inactive account");
            return Err(AuthzError::unauthorized("User account is inactive"));
        }

        Ok(user)
    }

    /// Require the identity's role to be one of `allowed`.
    ///
    /// Pure set membership; roles have no hierarchy. Returns the identity
    /// unchanged on success.
    ///
    /// # Errors
    ///
    /// `Forbidden` naming the allowed roles.
    pub fn authorize<'a>(&self, user: &'a User, allowed: &[Role]) -> Result<&'a User, AuthzError> {
        if allowed.contains(&user.role) {
            Ok(user)
        } else {
            debug!(user_id = %user.id, role = %user.role, "Role not in allowed set");
            Err(AuthzError::Forbidden {
                required: allowed.to_vec(),
            })
        }
    }

    /// Exchange a refresh token for a fresh access/refresh pair.
    ///
    /// The presented token must be of refresh type; the subject is
    /// re-resolved so a deactivated account cannot renew its access.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for any credential problem, `Store` on store outage,
    /// `Issue` if minting the replacement pair fails.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(User, TokenPair), AuthzError> {
        let claims = self.issuer.verify(refresh_token).map_err(|e| {
            debug!(error = %e, "Refresh token verification failed");
            AuthzError::unauthorized("Invalid or expired token")
        })?;

        if claims.typ != TokenType::Refresh {
            debug!(typ = %claims.typ, "Non-refresh token presented for refresh");
            return Err(AuthzError::unauthorized("Not a refresh token"));
        }

        let subject = claims
            .subject()
            .map_err(|_| AuthzError::unauthorized("Invalid token payload"))?;

        let user = self
            .store
            .find_by_id(subject)
            .await?
            .ok_or_else(|| AuthzError::unauthorized("User not found"))?;

        if !user.is_active {
            return Err(AuthzError::unauthorized("User account is inactive"));
        }

        let pair = self
            .issuer
            .issue(user.id, &user.username, user.role)
            .map_err(AuthzError::Issue)?;

        Ok((user, pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amana_auth::TokenConfig;
    use amana_core::{FixedClock, UserId};
    use amana_identity::InMemoryUserStore;
    use chrono::{TimeZone, Utc};

    const SECRET: &str = "gate-test-signing-secret-0123456789abcd";

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn sample_user(role: Role, active: bool) -> User {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap();
        User {
            id: UserId::new(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            full_name_en: "John Doe".to_string(),
            full_name_ar: "جون دو".to_string(),
            password_hash: None,
            role,
            is_active: active,
            is_directory_user: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn gate_with_user(user: &User, clock: Arc<FixedClock>) -> AuthorizationGate {
        let store = Arc::new(InMemoryUserStore::new());
        store.insert(user.clone()).await.unwrap();
        let issuer = TokenIssuer::new(TokenConfig::new(SECRET), clock).unwrap();
        AuthorizationGate::new(issuer, store)
    }

    fn issuer(clock: Arc<FixedClock>) -> TokenIssuer {
        TokenIssuer::new(TokenConfig::new(SECRET), clock).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_valid_token() {
        let clock = fixed_clock();
        let user = sample_user(Role::Viewer, true);
        let gate = gate_with_user(&user, clock.clone()).await;

        let pair = issuer(clock)
            .issue(user.id, &user.username, user.role)
            .unwrap();
        let resolved = gate.authenticate(&pair.access).await.unwrap();

        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.role, Role::Viewer);
    }

    #[tokio::test]
    async fn test_authenticate_garbage_token() {
        let clock = fixed_clock();
        let user = sample_user(Role::Viewer, true);
        let gate = gate_with_user(&user, clock).await;

        let err = gate.authenticate("not.a.token").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_authenticate_expired_token() {
        let clock = fixed_clock();
        let user = sample_user(Role::Viewer, true);
        let gate = gate_with_user(&user, clock.clone()).await;

        let pair = issuer(clock.clone())
            .issue(user.id, &user.username, user.role)
            .unwrap();

        clock.advance(chrono::Duration::minutes(15));
        let err = gate.authenticate(&pair.access).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_subject() {
        let clock = fixed_clock();
        let user = sample_user(Role::Viewer, true);
        let gate = gate_with_user(&user, clock.clone()).await;

        // Token for an id that is not in the store.
        let pair = issuer(clock)
            .issue(UserId::new(), "ghost", Role::Viewer)
            .unwrap();
        let err = gate.authenticate(&pair.access).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_authenticate_inactive_user() {
        let clock = fixed_clock();
        let user = sample_user(Role::Admin, false);
        let gate = gate_with_user(&user, clock.clone()).await;

        let pair = issuer(clock)
            .issue(user.id, &user.username, user.role)
            .unwrap();
        let err = gate.authenticate(&pair.access).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_authorize_membership() {
        let clock = fixed_clock();
        let admin = sample_user(Role::Admin, true);
        let gate = gate_with_user(&admin, clock).await;

        // Admin passes an Admin-only check and the identity is unchanged.
        let authorized = gate.authorize(&admin, &[Role::Admin]).unwrap();
        assert_eq!(authorized, &admin);

        // Viewer fails the same check.
        let viewer = sample_user(Role::Viewer, true);
        let err = gate.authorize(&viewer, &[Role::Admin]).unwrap_err();
        assert!(err.is_forbidden());
    }

    #[tokio::test]
    async fn test_authorize_any_of_set() {
        let clock = fixed_clock();
        let auditor = sample_user(Role::Auditor, true);
        let gate = gate_with_user(&auditor, clock).await;

        assert!(gate
            .authorize(&auditor, &[Role::Admin, Role::Auditor])
            .is_ok());
        assert!(gate
            .authorize(&auditor, &[Role::Admin, Role::RiskOfficer])
            .is_err());
    }

    #[tokio::test]
    async fn test_refresh_exchanges_refresh_token() {
        let clock = fixed_clock();
        let user = sample_user(Role::RiskOfficer, true);
        let gate = gate_with_user(&user, clock.clone()).await;

        let pair = issuer(clock.clone())
            .issue(user.id, &user.username, user.role)
            .unwrap();

        clock.advance(chrono::Duration::minutes(30));
        let (refreshed_user, new_pair) = gate.refresh(&pair.refresh).await.unwrap();

        assert_eq!(refreshed_user.id, user.id);
        // The new access token is live even though the old one expired.
        assert!(gate.authenticate(&new_pair.access).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let clock = fixed_clock();
        let user = sample_user(Role::Viewer, true);
        let gate = gate_with_user(&user, clock.clone()).await;

        let pair = issuer(clock)
            .issue(user.id, &user.username, user.role)
            .unwrap();

        let err = gate.refresh(&pair.access).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_refresh_rejects_inactive_user() {
        let clock = fixed_clock();
        let user = sample_user(Role::Viewer, false);
        let gate = gate_with_user(&user, clock.clone()).await;

        let pair = issuer(clock)
            .issue(user.id, &user.username, user.role)
            .unwrap();

        let err = gate.refresh(&pair.refresh).await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
