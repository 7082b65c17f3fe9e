//! End-to-end login pipeline tests: identity resolution, token issuance,
//! and gate enforcement wired together over the in-memory store.

use amana_auth::{TokenConfig, TokenIssuer};
use amana_authz::AuthorizationGate;
use amana_core::{FixedClock, Role};
use amana_directory::{DirectoryClient, DirectoryConfig, DirectoryEntry, DirectoryResult};
use amana_identity::{
    CredentialStrategy, DirectoryStrategy, IdentityResolver, InMemoryUserStore, LocalStrategy,
    NewLocalUser, RoleMapper, UserStore,
};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;

const SECRET: &str = "login-flow-test-secret-0123456789abcdef";

/// Directory double: one known user with a fixed password and groups.
struct ScriptedDirectory {
    password: String,
    groups: Vec<String>,
    reachable: bool,
}

#[async_trait]
impl DirectoryClient for ScriptedDirectory {
    async fn bind(&self, _dn: &str, password: &str) -> DirectoryResult<bool> {
        if !self.reachable {
            return Err(amana_directory::DirectoryError::connection_failed(
                "connection refused",
            ));
        }
        Ok(password == self.password)
    }

    async fn search(
        &self,
        _base: &str,
        _filter: &str,
        _attrs: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        if !self.reachable {
            return Err(amana_directory::DirectoryError::connection_failed(
                "connection refused",
            ));
        }
        let mut attrs = HashMap::new();
        attrs.insert("mail".to_string(), vec!["sara@corp.example.com".to_string()]);
        attrs.insert("cn".to_string(), vec!["Sara Ahmed".to_string()]);
        attrs.insert("memberOf".to_string(), self.groups.clone());
        Ok(vec![DirectoryEntry {
            dn: "uid=sahmed,ou=users,dc=example,dc=com".to_string(),
            attrs,
        }])
    }
}

struct Pipeline {
    resolver: IdentityResolver,
    issuer: TokenIssuer,
    gate: AuthorizationGate,
    clock: Arc<FixedClock>,
    store: Arc<InMemoryUserStore>,
}

impl Pipeline {
    fn issue_for(&self, user: &amana_identity::User) -> amana_auth::TokenPair {
        self.issuer.issue(user.id, &user.username, user.role).unwrap()
    }
}

fn pipeline(directory: Option<ScriptedDirectory>) -> Pipeline {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    ));
    let store = Arc::new(InMemoryUserStore::new());
    let hasher = amana_auth::PasswordHasher::with_params(4096, 1, 1).unwrap();

    let mut strategies: Vec<Arc<dyn CredentialStrategy>> = Vec::new();
    if let Some(directory) = directory {
        let config = DirectoryConfig::new(
            "ldap.example.com",
            "dc=example,dc=com",
            "ou=users,dc=example,dc=com",
        );
        strategies.push(Arc::new(DirectoryStrategy::new(
            Arc::new(directory),
            config,
            store.clone(),
            RoleMapper::standard(),
            clock.clone(),
        )));
    }
    strategies.push(Arc::new(LocalStrategy::new(
        store.clone(),
        hasher.clone(),
        clock.clone(),
    )));

    let resolver = IdentityResolver::new(strategies, store.clone(), hasher, clock.clone());
    let issuer = TokenIssuer::new(TokenConfig::new(SECRET), clock.clone()).unwrap();
    let gate = AuthorizationGate::new(issuer.clone(), store.clone());

    Pipeline {
        resolver,
        issuer,
        gate,
        clock,
        store,
    }
}

fn jdoe() -> NewLocalUser {
    NewLocalUser {
        username: "jdoe".to_string(),
        email: "jdoe@example.com".to_string(),
        password: "p@ss1234".to_string(),
        full_name_en: "John Doe".to_string(),
        full_name_ar: "جون دو".to_string(),
        role: Role::Viewer,
    }
}

#[tokio::test]
async fn local_viewer_full_pipeline() {
    let p = pipeline(None);

    // Create a local viewer, log in, present the access token, and hit a
    // role wall.
    p.resolver.create_local_user(jdoe()).await.unwrap();

    let user = p.resolver.resolve("jdoe", "p@ss1234").await.unwrap();
    assert_eq!(user.role, Role::Viewer);

    let pair = p.issue_for(&user);
    let authenticated = p.gate.authenticate(&pair.access).await.unwrap();
    assert_eq!(authenticated.id, user.id);
    assert_eq!(authenticated.username, "jdoe");

    let err = p
        .gate
        .authorize(&authenticated, &[Role::Admin, Role::RiskOfficer])
        .unwrap_err();
    assert!(err.is_forbidden());

    // The same identity passes a viewer-inclusive check.
    assert!(p
        .gate
        .authorize(&authenticated, &[Role::Admin, Role::Viewer])
        .is_ok());
}

#[tokio::test]
async fn access_token_expires_refresh_survives() {
    let p = pipeline(None);
    p.resolver.create_local_user(jdoe()).await.unwrap();

    let user = p.resolver.resolve("jdoe", "p@ss1234").await.unwrap();
    let pair = p.issue_for(&user);

    p.clock.advance(Duration::minutes(16));

    let err = p.gate.authenticate(&pair.access).await.unwrap_err();
    assert!(err.is_unauthorized());

    let (_, fresh) = p.gate.refresh(&pair.refresh).await.unwrap();
    assert!(p.gate.authenticate(&fresh.access).await.is_ok());
}

#[tokio::test]
async fn deactivated_user_loses_access_and_refresh() {
    let p = pipeline(None);
    p.resolver.create_local_user(jdoe()).await.unwrap();

    let mut user = p.resolver.resolve("jdoe", "p@ss1234").await.unwrap();
    let pair = p.issue_for(&user);

    user.is_active = false;
    p.store.save(&user).await.unwrap();

    assert!(p.gate.authenticate(&pair.access).await.is_err());
    assert!(p.gate.refresh(&pair.refresh).await.is_err());
    assert!(p.resolver.resolve("jdoe", "p@ss1234").await.is_err());
}

#[tokio::test]
async fn directory_login_synchronizes_role_for_gate() {
    let p = pipeline(Some(ScriptedDirectory {
        password: "dir-secret".to_string(),
        groups: vec!["CN=GRC-Risk-Officers,OU=Groups,DC=example,DC=com".to_string()],
        reachable: true,
    }));

    let user = p.resolver.resolve("sahmed", "dir-secret").await.unwrap();
    assert_eq!(user.role, Role::RiskOfficer);
    assert_eq!(user.email, "sara@corp.example.com");

    let pair = p.issue_for(&user);
    let authenticated = p.gate.authenticate(&pair.access).await.unwrap();

    assert!(p
        .gate
        .authorize(&authenticated, &[Role::Admin, Role::RiskOfficer])
        .is_ok());
    assert!(p.gate.authorize(&authenticated, &[Role::Admin]).is_err());
}

#[tokio::test]
async fn directory_outage_keeps_local_accounts_working() {
    let p = pipeline(Some(ScriptedDirectory {
        password: "dir-secret".to_string(),
        groups: Vec::new(),
        reachable: false,
    }));

    p.resolver.create_local_user(jdoe()).await.unwrap();

    // The outage is invisible to a valid local login...
    let user = p.resolver.resolve("jdoe", "p@ss1234").await.unwrap();
    let pair = p.issue_for(&user);
    assert!(p.gate.authenticate(&pair.access).await.is_ok());

    // ...and a failed login looks exactly like a bad password.
    let err = p.resolver.resolve("jdoe", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid username or password");
}
