//! Directory-service client for Amana.
//!
//! Wraps an external LDAP/Active Directory server behind the
//! [`DirectoryClient`] capability: a credential-checking `bind` and an
//! attribute `search`. Identity resolution composes these two calls; this
//! crate knows nothing about users or roles.
//!
//! # Example
//!
//! ```rust,ignore
//! use amana_directory::{DirectoryClient, DirectoryConfig, LdapDirectoryClient};
//!
//! let config = DirectoryConfig::new(
//!     "ldap.example.com",
//!     "dc=example,dc=com",
//!     "ou=users,dc=example,dc=com",
//! );
//! let client = LdapDirectoryClient::new(config)?;
//!
//! let bound = client.bind("uid=jdoe,ou=users,dc=example,dc=com", "p@ss1234").await?;
//! if bound {
//!     let entries = client
//!         .search(
//!             "ou=users,dc=example,dc=com",
//!             "(sAMAccountName=jdoe)",
//!             &["mail", "cn", "memberOf"],
//!         )
//!         .await?;
//! }
//! ```

mod client;
mod config;
mod error;
mod filter;

pub use client::{DirectoryClient, DirectoryEntry, LdapDirectoryClient};
pub use config::DirectoryConfig;
pub use error::{DirectoryError, DirectoryResult};
pub use filter::{escape_dn_value, escape_filter_value};
