//! Tenant repository implementation.

use sqlx::PgPool;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_entity::tenant::{CreateTenant, Tenant};

/// Repository for tenants.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Create a new tenant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return the tenant with this slug, creating it first if needed.
    pub async fn create_or_get(&self, data: &CreateTenant) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            r#"INSERT INTO tenants (name, slug, subscription_end_date)
               VALUES ($1, $2, $3)
               ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
               RETURNING *"#,
        )
        .bind(&data.name)
        .bind(&data.slug)
        .bind(data.subscription_end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create tenant", e))
    }
}
