//! Directory connection configuration.

use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::{escape_dn_value, escape_filter_value};
use amana_core::config::{env_or, parse_env_or};
use amana_core::ConfigError;
use serde::{Deserialize, Serialize};

fn default_port() -> u16 {
    389
}

fn default_user_filter() -> String {
    "(sAMAccountName={username})".to_string()
}

fn default_user_dn_attribute() -> String {
    "uid".to_string()
}

fn default_email_domain() -> String {
    "example.com".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

/// Configuration for the LDAP directory client.
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory server hostname or IP address.
    pub host: String,

    /// Directory server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Use STARTTLS upgrade on a plain connection.
    #[serde(default)]
    pub use_starttls: bool,

    /// Base DN for the directory (e.g. "dc=example,dc=com").
    pub base_dn: String,

    /// Service-account bind DN for attribute searches. Optional; searches
    /// run anonymously when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,

    /// Service-account bind password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Search base for user entries (e.g. "ou=users,dc=example,dc=com").
    pub user_search_base: String,

    /// Filter template for locating a user entry; must contain a
    /// `{username}` placeholder.
    #[serde(default = "default_user_filter")]
    pub user_filter: String,

    /// Attribute naming users in bind DNs (e.g. "uid" or "cn").
    #[serde(default = "default_user_dn_attribute")]
    pub user_dn_attribute: String,

    /// Mail domain used when a directory entry carries no `mail` attribute.
    #[serde(default = "default_email_domain")]
    pub default_email_domain: String,

    /// Connection timeout in seconds. Directory calls must never block
    /// indefinitely; a timeout falls through to local authentication.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("use_starttls", &self.use_starttls)
            .field("base_dn", &self.base_dn)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("user_search_base", &self.user_search_base)
            .field("user_filter", &self.user_filter)
            .field("user_dn_attribute", &self.user_dn_attribute)
            .field("default_email_domain", &self.default_email_domain)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DirectoryConfig {
    /// Create a config with required fields and defaults for the rest.
    pub fn new(
        host: impl Into<String>,
        base_dn: impl Into<String>,
        user_search_base: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            use_ssl: false,
            use_starttls: false,
            base_dn: base_dn.into(),
            bind_dn: None,
            bind_password: None,
            user_search_base: user_search_base.into(),
            user_filter: default_user_filter(),
            user_dn_attribute: default_user_dn_attribute(),
            default_email_domain: default_email_domain(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }

    /// Set the service account used for attribute searches.
    pub fn with_service_account(
        mut self,
        bind_dn: impl Into<String>,
        bind_password: impl Into<String>,
    ) -> Self {
        self.bind_dn = Some(bind_dn.into());
        self.bind_password = Some(bind_password.into());
        self
    }

    /// Enable SSL (LDAPS) and switch to the LDAPS port.
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self.port = 636;
        self
    }

    /// Enable STARTTLS.
    #[must_use]
    pub fn with_starttls(mut self) -> Self {
        self.use_starttls = true;
        self
    }

    /// Set the user filter template.
    pub fn with_user_filter(mut self, filter: impl Into<String>) -> Self {
        self.user_filter = filter.into();
        self
    }

    /// Set the attribute naming users in bind DNs.
    pub fn with_user_dn_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.user_dn_attribute = attribute.into();
        self
    }

    /// Set the fallback mail domain.
    pub fn with_default_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_email_domain = domain.into();
        self
    }

    /// The directory URL.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Bind DN for a user attempting to log in, with the username escaped
    /// per RFC 4514.
    #[must_use]
    pub fn user_dn(&self, username: &str) -> String {
        format!(
            "{}={},{}",
            self.user_dn_attribute,
            escape_dn_value(username),
            self.user_search_base
        )
    }

    /// Search filter for a user entry, with the username escaped per
    /// RFC 4515.
    #[must_use]
    pub fn search_filter(&self, username: &str) -> String {
        self.user_filter
            .replace("{username}", &escape_filter_value(username))
    }

    /// Load from environment variables.
    ///
    /// - `LDAP_SERVER` - server URL (default: "ldap://localhost:389")
    /// - `LDAP_BASE_DN` - default: "dc=example,dc=com"
    /// - `LDAP_BIND_DN` / `LDAP_BIND_PASSWORD` - service account (optional)
    /// - `LDAP_USER_SEARCH_BASE` - default: "ou=users,dc=example,dc=com"
    /// - `LDAP_USER_SEARCH_FILTER` - default: "(sAMAccountName={username})"
    /// - `LDAP_CONNECT_TIMEOUT_SECS` - default: 10
    pub fn from_env() -> Result<Self, ConfigError> {
        let server = env_or("LDAP_SERVER", "ldap://localhost:389");
        let (host, port, use_ssl) = parse_server_url(&server)?;

        let bind_dn = env_or("LDAP_BIND_DN", "");
        let bind_password = env_or("LDAP_BIND_PASSWORD", "");

        Ok(Self {
            host,
            port,
            use_ssl,
            use_starttls: false,
            base_dn: env_or("LDAP_BASE_DN", "dc=example,dc=com"),
            bind_dn: (!bind_dn.is_empty()).then_some(bind_dn),
            bind_password: (!bind_password.is_empty()).then_some(bind_password),
            user_search_base: env_or("LDAP_USER_SEARCH_BASE", "ou=users,dc=example,dc=com"),
            user_filter: env_or("LDAP_USER_SEARCH_FILTER", "(sAMAccountName={username})"),
            user_dn_attribute: env_or("LDAP_USER_DN_ATTRIBUTE", "uid"),
            default_email_domain: env_or("LDAP_DEFAULT_EMAIL_DOMAIN", "example.com"),
            connect_timeout_secs: parse_env_or("LDAP_CONNECT_TIMEOUT_SECS", 10)?,
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.host.is_empty() {
            return Err(DirectoryError::invalid_configuration("host is required"));
        }
        if self.base_dn.is_empty() {
            return Err(DirectoryError::invalid_configuration("base_dn is required"));
        }
        if self.user_search_base.is_empty() {
            return Err(DirectoryError::invalid_configuration(
                "user_search_base is required",
            ));
        }
        if !self.user_filter.contains("{username}") {
            return Err(DirectoryError::invalid_configuration(
                "user_filter must contain a {username} placeholder",
            ));
        }
        if self.use_ssl && self.use_starttls {
            return Err(DirectoryError::invalid_configuration(
                "cannot use both SSL and STARTTLS",
            ));
        }
        Ok(())
    }
}

/// Parse an "ldap[s]://host[:port]" URL into its parts.
fn parse_server_url(server: &str) -> Result<(String, u16, bool), ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        var: "LDAP_SERVER".to_string(),
        message: message.to_string(),
    };

    let (rest, use_ssl) = if let Some(rest) = server.strip_prefix("ldaps://") {
        (rest, true)
    } else if let Some(rest) = server.strip_prefix("ldap://") {
        (rest, false)
    } else {
        return Err(invalid("must be an ldap:// or ldaps:// URL"));
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(invalid("missing host"));
    }

    match rest.split_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .map_err(|_| invalid("port must be a number between 1 and 65535"))?;
            Ok((host.to_string(), port, use_ssl))
        }
        None => Ok((rest.to_string(), if use_ssl { 636 } else { 389 }, use_ssl)),
    }
}
