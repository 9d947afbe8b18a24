//! Initial data seeding configuration.

use serde::{Deserialize, Serialize};

/// Seeding settings used by `warden-server seed` and on first start.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    /// Super administrator username. Empty skips creation.
    #[serde(default)]
    pub super_admin_username: String,
    /// Super administrator password. Empty skips creation.
    #[serde(default)]
    pub super_admin_password: String,
    /// Super administrator display name.
    #[serde(default)]
    pub super_admin_full_name: String,
    /// Super administrator phone.
    #[serde(default)]
    pub super_admin_phone: Option<String>,
    /// Whether to create the demo tenant with one user per role.
    #[serde(default)]
    pub demo_tenant: bool,
}
