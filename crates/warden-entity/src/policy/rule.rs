//! Policy and role-binding rules.

use serde::{Deserialize, Serialize};

/// Prefix accepted on rule subjects that name a role rather than a user.
pub const ROLE_PREFIX: &str = "role:";

/// Tenant or action value matching anything.
pub const WILDCARD: &str = "*";

/// Grants `action` on resources matching `resource` to `subject` inside `tenant`.
///
/// `subject` is either a user id, a bare role name, or a role name with the
/// `role:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRule {
    /// User id or role name.
    pub subject: String,
    /// Tenant id, or `*`.
    pub tenant: String,
    /// Resource pattern (key-match syntax).
    pub resource: String,
    /// Action (HTTP method), or `*`.
    pub action: String,
}

impl PolicyRule {
    /// Build a rule from its four components.
    pub fn new(
        subject: impl Into<String>,
        tenant: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            tenant: tenant.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// The subject with any `role:` prefix removed.
    pub fn bare_subject(&self) -> &str {
        self.subject
            .strip_prefix(ROLE_PREFIX)
            .unwrap_or(&self.subject)
    }
}

/// Binds `user` to `role` inside `tenant`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupingRule {
    /// User id.
    pub user: String,
    /// Role name.
    pub role: String,
    /// Tenant id, or `*`.
    pub tenant: String,
}

impl GroupingRule {
    /// Build a binding from its three components.
    pub fn new(user: impl Into<String>, role: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            role: role.into(),
            tenant: tenant.into(),
        }
    }
}
