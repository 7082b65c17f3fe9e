//! Directory client trait and LDAP implementation.

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};

/// LDAP result code for invalid credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// A directory entry: its DN plus the requested attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Distinguished name of the entry.
    pub dn: String,

    /// Attribute values, keyed by attribute name.
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// First value of an attribute, if present and non-empty.
    #[must_use]
    pub fn first(&self, attr: &str) -> Option<&str> {
        self.attrs
            .get(attr)
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// All values of an attribute (empty slice when absent).
    #[must_use]
    pub fn values(&self, attr: &str) -> &[String] {
        self.attrs.get(attr).map_or(&[], Vec::as_slice)
    }
}

/// Abstract directory-service capability.
///
/// `bind` answers "do these credentials authenticate?"; `search` reads
/// entry attributes. Implementations must be safe to share across
/// concurrent authentication attempts.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Attempt to bind with the given DN and password.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` when the directory
    /// rejects the credentials. Transport and protocol failures are errors.
    async fn bind(&self, dn: &str, password: &str) -> DirectoryResult<bool>;

    /// Search under `base` with the given filter, returning the named
    /// attributes of each matching entry.
    async fn search(
        &self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>>;
}

/// Directory client backed by an LDAP/Active Directory server.
///
/// Connections are created per operation: a login bind must use the
/// presented credentials, so there is no service connection to reuse.
pub struct LdapDirectoryClient {
    config: DirectoryConfig,
}

impl LdapDirectoryClient {
    /// Create a client with a validated configuration.
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Open a connection and spawn its driver task.
    async fn connect(&self) -> DirectoryResult<Ldap> {
        let url = self.config.url();
        debug!(url = %url, "Connecting to directory server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .set_starttls(self.config.use_starttls);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                DirectoryError::connection_failed(format!(
                    "Failed to connect to directory server at {url}: {e}"
                ))
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "Directory connection driver error");
            }
        });

        Ok(ldap)
    }
}

#[async_trait]
impl DirectoryClient for LdapDirectoryClient {
    async fn bind(&self, dn: &str, password: &str) -> DirectoryResult<bool> {
        // RFC 4513 §5.1.2: an empty password is an unauthenticated bind and
        // must never count as a credential check.
        if password.is_empty() {
            return Ok(false);
        }

        let mut ldap = self.connect().await?;

        let result = ldap.simple_bind(dn, password).await.map_err(|e| {
            DirectoryError::connection_failed(format!("Bind request failed for {dn}: {e}"))
        })?;

        let bound = match result.rc {
            0 => true,
            RC_INVALID_CREDENTIALS => false,
            code => {
                return Err(DirectoryError::BindFailed {
                    code,
                    message: result.text,
                });
            }
        };

        if let Err(e) = ldap.unbind().await {
            debug!(error = %e, "Error during directory unbind");
        }

        debug!(dn = %dn, bound, "Directory bind attempt completed");
        Ok(bound)
    }

    async fn search(
        &self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        let mut ldap = self.connect().await?;

        // Searches run under the service account when one is configured,
        // anonymously otherwise.
        if let (Some(bind_dn), Some(bind_password)) =
            (&self.config.bind_dn, &self.config.bind_password)
        {
            let result = ldap.simple_bind(bind_dn, bind_password).await.map_err(|e| {
                DirectoryError::connection_failed(format!(
                    "Service bind request failed for {bind_dn}: {e}"
                ))
            })?;
            if result.rc != 0 {
                return Err(DirectoryError::BindFailed {
                    code: result.rc,
                    message: result.text,
                });
            }
        }

        let result = ldap
            .search(base, Scope::Subtree, filter, attrs.to_vec())
            .await
            .map_err(|e| DirectoryError::search_failed(format!("Search under {base} failed: {e}")))?;

        let (entries, _) = result
            .success()
            .map_err(|e| DirectoryError::search_failed(format!("Search under {base} failed: {e}")))?;

        let entries: Vec<DirectoryEntry> = entries
            .into_iter()
            .map(|e| {
                let entry = SearchEntry::construct(e);
                DirectoryEntry {
                    dn: entry.dn,
                    attrs: entry.attrs,
                }
            })
            .collect();

        if let Err(e) = ldap.unbind().await {
            debug!(error = %e, "Error during directory unbind");
        }

        debug!(base = %base, count = entries.len(), "Directory search completed");
        Ok(entries)
    }
}
