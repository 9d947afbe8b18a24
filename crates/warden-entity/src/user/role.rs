//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a user can hold.
///
/// `SuperAdmin` is platform-wide and carries no tenant. Every other role is
/// scoped to exactly one tenant; what it may do there is decided by policy
/// rules, not by the role itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform operator, outside any tenant.
    SuperAdmin,
    /// Internal service account of a tenant.
    System,
    /// Tenant owner.
    Owner,
    /// Tenant administrator.
    Admin,
    /// Clinical staff: doctor.
    Doctor,
    /// Clinical staff: nurse.
    Nurse,
    /// Clinical staff: technician.
    Technician,
    /// Front desk.
    Reception,
}

impl UserRole {
    /// All roles, in declaration order.
    pub const ALL: [UserRole; 8] = [
        Self::SuperAdmin,
        Self::System,
        Self::Owner,
        Self::Admin,
        Self::Doctor,
        Self::Nurse,
        Self::Technician,
        Self::Reception,
    ];

    /// Whether this role lives outside any tenant.
    pub fn is_platform(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Return the role as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::System => "system",
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::Technician => "technician",
            Self::Reception => "reception",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| format!("Invalid user role: '{s}'"))
    }
}
