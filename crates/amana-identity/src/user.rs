//! User identity model.

use amana_core::{Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user identity.
///
/// Usernames and emails are globally unique and immutable after creation.
/// Identities are never hard-deleted; deactivation is via `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,

    /// Unique login name.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Display name, English locale.
    pub full_name_en: String,

    /// Display name, Arabic locale.
    pub full_name_ar: String,

    /// Argon2id password hash. Present only for locally-created accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Authorization role.
    pub role: Role,

    /// Whether the account may authenticate (false = deactivated).
    pub is_active: bool,

    /// Provenance: true when this identity is synchronized from the
    /// directory service, false for locally-created accounts.
    pub is_directory_user: bool,

    /// When the user last authenticated successfully.
    pub last_login: Option<DateTime<Utc>>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether local password verification may be attempted for this user.
    ///
    /// A directory-sourced identity may still carry a hash as a legacy
    /// artifact, but authentication for such users must never depend on it;
    /// they authenticate against the directory or not at all.
    #[must_use]
    pub fn has_usable_password(&self) -> bool {
        !self.is_directory_user && self.password_hash.is_some()
    }
}
