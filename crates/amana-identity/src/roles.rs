//! Role derivation from directory group memberships.
//!
//! The directory does not carry platform roles; they are inferred from
//! group names by an ordered list of (keyword, role) rules. Rules are
//! evaluated rule-major: every group is checked against the first rule
//! before any group is checked against the second, and the first matching
//! rule wins regardless of how many later rules would also match.

use amana_core::Role;

/// A single case-insensitive substring rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRule {
    keyword: String,
    role: Role,
}

impl RoleRule {
    /// Create a rule mapping group names containing `keyword` to `role`.
    pub fn new(keyword: impl Into<String>, role: Role) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            role,
        }
    }

    /// The role this rule grants.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether any of the (lowercased) group names matches this rule.
    fn matches(&self, groups: &[String]) -> bool {
        groups.iter().any(|g| g.contains(&self.keyword))
    }
}

/// Ordered rule list mapping group memberships to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMapper {
    rules: Vec<RoleRule>,
    fallback: Role,
}

impl RoleMapper {
    /// Create a mapper with explicit rules, falling back to `fallback`
    /// when nothing matches.
    #[must_use]
    pub fn new(rules: Vec<RoleRule>, fallback: Role) -> Self {
        Self { rules, fallback }
    }

    /// The standard policy: admin > risk > audit, else Viewer.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            vec![
                RoleRule::new("admin", Role::Admin),
                RoleRule::new("risk", Role::RiskOfficer),
                RoleRule::new("audit", Role::Auditor),
            ],
            Role::Viewer,
        )
    }

    /// Derive a role from directory group names.
    #[must_use]
    pub fn map(&self, groups: &[String]) -> Role {
        let lowered: Vec<String> = groups.iter().map(|g| g.to_lowercase()).collect();

        for rule in &self.rules {
            if rule.matches(&lowered) {
                return rule.role();
            }
        }
        self.fallback
    }
}

impl Default for RoleMapper {
    fn default() -> Self {
        Self::standard()
    }
}
