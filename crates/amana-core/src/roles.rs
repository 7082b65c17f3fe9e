//! Role enumeration for role-based access control.
//!
//! Roles form a closed set with no implicit hierarchy: authorization checks
//! are set-membership over allowed roles, never rank comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A user's role within the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full administrative access, including user management.
    Admin,
    /// Owns the risk register and risk treatment workflows.
    RiskOfficer,
    /// Conducts audits and records findings.
    Auditor,
    /// Read-only access.
    #[default]
    Viewer,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::RiskOfficer, Role::Auditor, Role::Viewer];

    /// The canonical wire representation of this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::RiskOfficer => "RISK_OFFICER",
            Role::Auditor => "AUDITOR",
            Role::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "RISK_OFFICER" => Ok(Role::RiskOfficer),
            "AUDITOR" => Ok(Role::Auditor),
            "VIEWER" => Ok(Role::Viewer),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}
