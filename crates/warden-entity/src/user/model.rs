//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Owning tenant. `None` only for platform roles.
    pub tenant_id: Option<Uuid>,
    /// Human-readable name.
    pub full_name: String,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Assigned role.
    pub role: UserRole,
    /// Inactive users cannot sign in or refresh.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check if the user can sign in right now.
    pub fn can_login(&self) -> bool {
        self.is_active
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Owning tenant.
    pub tenant_id: Option<Uuid>,
    /// Human-readable name.
    pub full_name: String,
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Assigned role.
    pub role: UserRole,
}
