//! Tenant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An isolated organization (a clinic) that owns users and policies.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique URL-safe slug.
    pub slug: String,
    /// Whether the tenant is active.
    pub is_active: bool,
    /// End of the paid subscription.
    pub subscription_end_date: Option<DateTime<Utc>>,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Display name.
    pub name: String,
    /// Unique URL-safe slug.
    pub slug: String,
    /// End of the paid subscription.
    pub subscription_end_date: Option<DateTime<Utc>>,
}
