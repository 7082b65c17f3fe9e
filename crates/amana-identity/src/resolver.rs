//! Credential resolution.
//!
//! A login attempt walks an ordered chain of [`CredentialStrategy`]
//! implementations. Each strategy either authenticates the user, declares
//! itself not applicable, or reports a transient failure; the latter two
//! are treated identically and fall through to the next strategy. Only
//! user-store outages propagate as errors. The default chain tries the
//! external directory first, then the local credential store, strictly in
//! that order and never in parallel.

use crate::error::IdentityError;
use crate::roles::RoleMapper;
use crate::store::{DirectoryProfile, StoreError, UserStore};
use crate::user::User;
use amana_auth::{AuthError, PasswordHasher};
use amana_core::{Clock, Role, UserId};
use amana_directory::{DirectoryClient, DirectoryConfig, DirectoryEntry};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attributes requested from the directory for profile synchronization.
const PROFILE_ATTRS: [&str; 5] = ["mail", "cn", "givenName", "sn", "memberOf"];

/// The tagged result of a single strategy attempt.
#[derive(Debug, Clone)]
pub enum StrategyOutcome {
    /// The credentials authenticated this identity.
    Authenticated(User),
    /// This strategy cannot vouch for these credentials (unknown user,
    /// wrong password, no directory entry). Falls through.
    NotApplicable,
    /// The backing service could not be consulted (unreachable, timeout).
    /// Falls through; never surfaced to the login caller.
    TransientFailure,
}

/// A single credential-resolution strategy.
#[async_trait]
pub trait CredentialStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Attempt to authenticate the given credentials.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures of the user store itself; everything
    /// else is expressed through [`StrategyOutcome`].
    async fn attempt(
        &self,
        username: &str,
        password: &str,
    ) -> Result<StrategyOutcome, IdentityError>;
}

/// Authenticates against the external directory and synchronizes the
/// resulting profile into the user store.
pub struct DirectoryStrategy {
    client: Arc<dyn DirectoryClient>,
    config: DirectoryConfig,
    store: Arc<dyn UserStore>,
    mapper: RoleMapper,
    clock: Arc<dyn Clock>,
}

impl DirectoryStrategy {
    /// Create a directory strategy.
    pub fn new(
        client: Arc<dyn DirectoryClient>,
        config: DirectoryConfig,
        store: Arc<dyn UserStore>,
        mapper: RoleMapper,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            config,
            store,
            mapper,
            clock,
        }
    }

    /// Extract the canonical profile from a directory entry.
    fn profile_from_entry(&self, username: &str, entry: &DirectoryEntry) -> DirectoryProfile {
        let email = entry
            .first("mail")
            .map_or_else(
                || format!("{username}@{}", self.config.default_email_domain),
                ToString::to_string,
            );
        let full_name_en = entry
            .first("cn")
            .map_or_else(|| username.to_string(), ToString::to_string);

        DirectoryProfile {
            email,
            full_name_en,
            // The directory does not carry the Arabic display name.
            full_name_ar: username.to_string(),
            role: self.mapper.map(entry.values("memberOf")),
        }
    }
}

#[async_trait]
impl CredentialStrategy for DirectoryStrategy {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn attempt(
        &self,
        username: &str,
        password: &str,
    ) -> Result<StrategyOutcome, IdentityError> {
        let user_dn = self.config.user_dn(username);

        let bound = match self.client.bind(&user_dn, password).await {
            Ok(bound) => bound,
            Err(e) => {
                warn!(username = %username, error = %e, "Directory bind unavailable");
                return Ok(StrategyOutcome::TransientFailure);
            }
        };
        if !bound {
            debug!(username = %username, "Directory rejected credentials");
            return Ok(StrategyOutcome::NotApplicable);
        }

        let filter = self.config.search_filter(username);
        let entries = match self
            .client
            .search(&self.config.user_search_base, &filter, &PROFILE_ATTRS)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(username = %username, error = %e, "Directory search unavailable");
                return Ok(StrategyOutcome::TransientFailure);
            }
        };

        let Some(entry) = entries.first() else {
            debug!(username = %username, "Directory bind succeeded but no entry matched");
            return Ok(StrategyOutcome::NotApplicable);
        };

        let profile = self.profile_from_entry(username, entry);
        // Store failures are not absorbed: they signal an outage the caller
        // must see, unlike anything the directory does.
        let user = self
            .store
            .upsert_directory_user(username, profile, self.clock.now())
            .await?;

        info!(username = %username, user_id = %user.id, "Directory authentication successful");
        Ok(StrategyOutcome::Authenticated(user))
    }
}

/// Authenticates against locally-stored Argon2id credentials.
pub struct LocalStrategy {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl LocalStrategy {
    /// Create a local strategy.
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            hasher,
            clock,
        }
    }
}

#[async_trait]
impl CredentialStrategy for LocalStrategy {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn attempt(
        &self,
        username: &str,
        password: &str,
    ) -> Result<StrategyOutcome, IdentityError> {
        let Some(mut user) = self.store.find_by_username(username).await? else {
            debug!(username = %username, "No local account");
            return Ok(StrategyOutcome::NotApplicable);
        };

        if !user.is_active {
            debug!(username = %username, "Local account is inactive");
            return Ok(StrategyOutcome::NotApplicable);
        }

        if !user.has_usable_password() {
            debug!(username = %username, "Local account has no usable password");
            return Ok(StrategyOutcome::NotApplicable);
        }
        let Some(hash) = user.password_hash.clone() else {
            return Ok(StrategyOutcome::NotApplicable);
        };

        match self.hasher.verify(password, &hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!(username = %username, "Local password mismatch");
                return Ok(StrategyOutcome::NotApplicable);
            }
            Err(AuthError::InvalidHashFormat) => {
                warn!(username = %username, "Stored password hash is unparseable");
                return Ok(StrategyOutcome::NotApplicable);
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Password verification failed");
                return Ok(StrategyOutcome::NotApplicable);
            }
        }

        let now = self.clock.now();
        user.last_login = Some(now);
        user.updated_at = now;
        self.store.save(&user).await?;

        info!(username = %username, user_id = %user.id, "Local authentication successful");
        Ok(StrategyOutcome::Authenticated(user))
    }
}

/// A new local account request.
#[derive(Debug, Clone)]
pub struct NewLocalUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name_en: String,
    pub full_name_ar: String,
    pub role: Role,
}

/// Resolves credentials to a canonical identity through a strategy chain,
/// and provisions local accounts.
pub struct IdentityResolver {
    strategies: Vec<Arc<dyn CredentialStrategy>>,
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl IdentityResolver {
    /// Create a resolver with an explicit strategy chain.
    pub fn new(
        strategies: Vec<Arc<dyn CredentialStrategy>>,
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            strategies,
            store,
            hasher,
            clock,
        }
    }

    /// Standard chain: directory first, local fallback.
    pub fn with_directory(
        client: Arc<dyn DirectoryClient>,
        config: DirectoryConfig,
        store: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let hasher = PasswordHasher::default();
        let strategies: Vec<Arc<dyn CredentialStrategy>> = vec![
            Arc::new(DirectoryStrategy::new(
                client,
                config,
                store.clone(),
                RoleMapper::standard(),
                clock.clone(),
            )),
            Arc::new(LocalStrategy::new(
                store.clone(),
                hasher.clone(),
                clock.clone(),
            )),
        ];
        Self::new(strategies, store, hasher, clock)
    }

    /// Local-only chain, for deployments without a directory.
    pub fn local_only(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        let hasher = PasswordHasher::default();
        let strategies: Vec<Arc<dyn CredentialStrategy>> = vec![Arc::new(LocalStrategy::new(
            store.clone(),
            hasher.clone(),
            clock.clone(),
        ))];
        Self::new(strategies, store, hasher, clock)
    }

    /// Resolve a username/password pair to an identity.
    ///
    /// Strategies are tried strictly in order; the first authentication
    /// wins. An exhausted chain fails with the undifferentiated
    /// `AuthenticationFailed`: the caller cannot distinguish a wrong
    /// password from an unknown user or an unreachable directory.
    ///
    /// # Errors
    ///
    /// `IdentityError::AuthenticationFailed` when no strategy accepts the
    /// credentials; `IdentityError::Store` when the user store is down.
    pub async fn resolve(&self, username: &str, password: &str) -> Result<User, IdentityError> {
        for strategy in &self.strategies {
            match strategy.attempt(username, password).await? {
                StrategyOutcome::Authenticated(user) => return Ok(user),
                StrategyOutcome::NotApplicable => {
                    debug!(strategy = strategy.name(), username = %username, "Strategy not applicable");
                }
                StrategyOutcome::TransientFailure => {
                    warn!(strategy = strategy.name(), username = %username, "Strategy unavailable, falling through");
                }
            }
        }

        debug!(username = %username, "All credential strategies exhausted");
        Err(IdentityError::AuthenticationFailed)
    }

    /// Create a local account.
    ///
    /// # Errors
    ///
    /// `UsernameExists` / `EmailExists` on uniqueness violations,
    /// `Password` if hashing fails, `Store` on store outage.
    pub async fn create_local_user(&self, new_user: NewLocalUser) -> Result<User, IdentityError> {
        if self
            .store
            .find_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(IdentityError::UsernameExists(new_user.username));
        }

        let password_hash = self.hasher.hash(&new_user.password)?;
        let now = self.clock.now();
        let (username, email) = (new_user.username.clone(), new_user.email.clone());

        let user = User {
            id: UserId::new(),
            username: new_user.username,
            email: new_user.email,
            full_name_en: new_user.full_name_en,
            full_name_ar: new_user.full_name_ar,
            password_hash: Some(password_hash),
            role: new_user.role,
            is_active: true,
            is_directory_user: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        };

        let user = self.store.insert(user).await.map_err(|e| match e {
            StoreError::Duplicate { field: "username" } => IdentityError::UsernameExists(username),
            StoreError::Duplicate { field: "email" } => IdentityError::EmailExists(email),
            other => IdentityError::Store(other),
        })?;

        info!(username = %user.username, user_id = %user.id, "Created local user");
        Ok(user)
    }
}
