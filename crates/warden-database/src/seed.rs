//! Initial data: the platform super administrator and the demo tenant.

use chrono::{Months, Utc};
use tracing::info;

use warden_auth::rbac::platform_policies;
use warden_auth::{AuthorizationGate, PasswordHasher};
use warden_core::config::seed::SeedConfig;
use warden_core::result::AppResult;
use warden_entity::policy::PolicyRule;
use warden_entity::tenant::{CreateTenant, Tenant};
use warden_entity::user::{CreateUser, UserRole};

use crate::repositories::{TenantRepository, UserRepository};

/// Slug of the demo tenant.
pub const DEMO_TENANT_SLUG: &str = "test-tenant";

/// Password shared by every demo user.
pub const DEMO_PASSWORD: &str = "password";

const DEMO_PHONE: &str = "123456789";

/// Demo users: one per tenant role.
const DEMO_USERS: [(&str, UserRole, &str); 7] = [
    ("system", UserRole::System, "Test System"),
    ("owner", UserRole::Owner, "Test Owner"),
    ("admin", UserRole::Admin, "Test Admin"),
    ("doctor", UserRole::Doctor, "Test Doctor"),
    ("nurse", UserRole::Nurse, "Test Nurse"),
    ("technician", UserRole::Technician, "Test Technician"),
    ("reception", UserRole::Reception, "Test Reception"),
];

/// Seeds users, tenants, and their authorization rules.
#[derive(Debug)]
pub struct Seeder<'a> {
    users: &'a UserRepository,
    tenants: &'a TenantRepository,
    gate: &'a AuthorizationGate,
    hasher: PasswordHasher,
}

impl<'a> Seeder<'a> {
    /// Create a seeder.
    pub fn new(
        users: &'a UserRepository,
        tenants: &'a TenantRepository,
        gate: &'a AuthorizationGate,
    ) -> Self {
        Self {
            users,
            tenants,
            gate,
            hasher: PasswordHasher::new(),
        }
    }

    /// Run every seeding step enabled in `config`.
    pub async fn run(&self, config: &SeedConfig) -> AppResult<()> {
        self.seed_platform_policies().await?;
        self.seed_super_admin(config).await?;
        if config.demo_tenant {
            self.seed_demo_tenant().await?;
        }
        Ok(())
    }

    /// Grant the super administrator every action under `/api/v1/` in any tenant.
    pub async fn seed_platform_policies(&self) -> AppResult<()> {
        for rule in platform_policies() {
            self.gate.add_policy(rule).await?;
        }
        Ok(())
    }

    /// Create the super administrator unless one exists or credentials are empty.
    ///
    /// Returns whether a user was created.
    pub async fn seed_super_admin(&self, config: &SeedConfig) -> AppResult<bool> {
        if config.super_admin_username.is_empty() || config.super_admin_password.is_empty() {
            tracing::warn!("Super admin username/password is empty, skipping");
            return Ok(false);
        }
        if self.users.super_admin_exists().await? {
            info!("Super admin already exists, skipping");
            return Ok(false);
        }

        let password_hash = self.hasher.hash_password(&config.super_admin_password)?;
        let user = self
            .users
            .create(&CreateUser {
                tenant_id: None,
                full_name: config.super_admin_full_name.clone(),
                username: config.super_admin_username.clone(),
                password_hash,
                phone: config.super_admin_phone.clone(),
                role: UserRole::SuperAdmin,
            })
            .await?;

        info!(username = %user.username, "Super admin created");
        Ok(true)
    }

    /// Create the demo tenant, its users, role bindings, and role policies.
    pub async fn seed_demo_tenant(&self) -> AppResult<Tenant> {
        let tenant = self
            .tenants
            .create_or_get(&CreateTenant {
                name: "Test Tenant".to_string(),
                slug: DEMO_TENANT_SLUG.to_string(),
                subscription_end_date: Utc::now().checked_add_months(Months::new(12)),
            })
            .await?;
        let tenant_key = tenant.id.to_string();

        self.gate.setup_default_policies(&tenant_key).await?;

        for (username, role, full_name) in DEMO_USERS {
            if self.users.find_by_username(username).await?.is_some() {
                info!(username, "Demo user already exists, skipping");
                continue;
            }

            let password_hash = self.hasher.hash_password(DEMO_PASSWORD)?;
            let user = self
                .users
                .create(&CreateUser {
                    tenant_id: Some(tenant.id),
                    full_name: full_name.to_string(),
                    username: username.to_string(),
                    password_hash,
                    phone: Some(DEMO_PHONE.to_string()),
                    role,
                })
                .await?;

            self.gate
                .add_role_to_user(&user.id.to_string(), role.as_str(), &tenant_key)
                .await?;
            for rule in demo_role_policies(role, &tenant_key) {
                self.gate.add_policy(rule).await?;
            }
            info!(username, role = %role, "Demo user created");
        }

        Ok(tenant)
    }
}

/// Per-role grants on the `/api/v1/test/*` probes, bound to bare role names.
fn demo_role_policies(role: UserRole, tenant: &str) -> Vec<PolicyRule> {
    let probe = |subject: &str, target: &str| {
        PolicyRule::new(subject, tenant, format!("/api/v1/test/{target}"), "GET")
    };
    match role {
        UserRole::Owner => vec![
            probe("owner", "owner"),
            probe("owner", "doctor"),
            probe("owner", "nurse"),
        ],
        UserRole::Doctor => vec![probe("doctor", "doctor")],
        UserRole::Nurse => vec![probe("nurse", "nurse")],
        _ => Vec::new(),
    }
}
