//! Identity resolution for Amana.
//!
//! This crate owns the user identity model and the dual-source
//! authentication flow: a login attempt is resolved against an ordered
//! chain of credential strategies (the external directory first, then the
//! local credential store), and a successful resolution synchronizes
//! directory-sourced identity into local storage.
//!
//! # Modules
//!
//! - [`user`] - The `User` identity model
//! - [`store`] - The `UserStore` capability and its in-memory implementation
//! - [`roles`] - Directory-group to role mapping rules
//! - [`resolver`] - The strategy-chain `IdentityResolver`
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use amana_core::{Role, SystemClock};
//! use amana_identity::{IdentityResolver, InMemoryUserStore, NewLocalUser};
//!
//! let store = Arc::new(InMemoryUserStore::new());
//! let resolver = IdentityResolver::local_only(store, Arc::new(SystemClock));
//!
//! resolver.create_local_user(NewLocalUser {
//!     username: "jdoe".into(),
//!     email: "jdoe@example.com".into(),
//!     password: "p@ss1234".into(),
//!     full_name_en: "John Doe".into(),
//!     full_name_ar: "جون دو".into(),
//!     role: Role::Viewer,
//! }).await?;
//!
//! let user = resolver.resolve("jdoe", "p@ss1234").await?;
//! assert_eq!(user.role, Role::Viewer);
//! ```

pub mod resolver;
pub mod roles;
pub mod store;
pub mod user;

mod error;

pub use error::IdentityError;
pub use resolver::{
    CredentialStrategy, DirectoryStrategy, IdentityResolver, LocalStrategy, NewLocalUser,
    StrategyOutcome,
};
pub use roles::{RoleMapper, RoleRule};
pub use store::{DirectoryProfile, InMemoryUserStore, StoreError, UserStore};
pub use user::User;
