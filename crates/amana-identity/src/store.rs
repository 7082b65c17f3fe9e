//! User record storage capability.
//!
//! The persistence binding is out of scope for this crate; [`UserStore`]
//! is the boundary. The one mutation contract the resolver relies on is
//! atomic upsert-by-unique-username: concurrent resolutions of the same
//! username must end with exactly one record (last writer wins on non-key
//! fields).

use crate::user::User;
use amana_core::{Role, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// User store errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store is unreachable or failed internally.
    #[error("User store unavailable: {0}")]
    Unavailable(String),

    /// A unique constraint was violated on insert.
    #[error("Duplicate value for unique field {field}")]
    Duplicate { field: &'static str },

    /// The record to update does not exist.
    #[error("User not found: {0}")]
    NotFound(String),
}

/// Canonical attributes extracted from a directory entry, applied to the
/// local record on every successful directory authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProfile {
    /// Email address from the directory (or derived fallback).
    pub email: String,
    /// English display name.
    pub full_name_en: String,
    /// Arabic display name.
    pub full_name_ar: String,
    /// Role derived from group memberships.
    pub role: Role,
}

/// Abstract user-record store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Insert a new user, enforcing username and email uniqueness.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Insert-or-update by unique username, atomically.
    ///
    /// An existing record keeps its id, creation stamp, and active flag but
    /// takes the profile's email, names, and role, is marked
    /// directory-sourced, and has its last-login stamped. A new record is
    /// created active, directory-sourced, and without a password hash.
    async fn upsert_directory_user(
        &self,
        username: &str,
        profile: DirectoryProfile,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError>;

    /// Persist changes to an existing user (matched by id).
    async fn save(&self, user: &User) -> Result<(), StoreError>;

    /// List all users.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}

/// In-memory `UserStore`.
///
/// A single lock over the username-keyed map makes every operation, the
/// upsert included, atomic with respect to concurrent resolutions.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored users (for tests).
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());

        if users.contains_key(&user.username) {
            return Err(StoreError::Duplicate { field: "username" });
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }

        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn upsert_directory_user(
        &self,
        username: &str,
        profile: DirectoryProfile,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());

        let user = match users.get_mut(username) {
            Some(existing) => {
                existing.email = profile.email;
                existing.full_name_en = profile.full_name_en;
                existing.full_name_ar = profile.full_name_ar;
                existing.role = profile.role;
                existing.is_directory_user = true;
                existing.last_login = Some(now);
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let user = User {
                    id: UserId::new(),
                    username: username.to_string(),
                    email: profile.email,
                    full_name_en: profile.full_name_en,
                    full_name_ar: profile.full_name_ar,
                    password_hash: None,
                    role: profile.role,
                    is_active: true,
                    is_directory_user: true,
                    last_login: Some(now),
                    created_at: now,
                    updated_at: now,
                };
                users.insert(username.to_string(), user.clone());
                user
            }
        };

        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());

        match users.get_mut(&user.username) {
            Some(existing) if existing.id == user.id => {
                *existing = user.clone();
                Ok(())
            }
            _ => Err(StoreError::NotFound(user.username.clone())),
        }
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}
