//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use warden_auth::UserDirectory;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_entity::user::{CreateUser, User};

/// Repository for user CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// List users belonging to a tenant.
    pub async fn find_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE tenant_id = $1 ORDER BY username")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// Whether a platform super administrator already exists.
    pub async fn super_admin_exists(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'super_admin')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check super admin", e)
        })
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (tenant_id, full_name, username, password_hash, phone, role)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(data.tenant_id)
        .bind(&data.full_name)
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(&data.phone)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(format!("Username '{}' already exists", data.username));
            }
            AppError::with_source(ErrorKind::Database, "Failed to create user", e)
        })
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.find_by_id(id).await
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.find_by_username(username).await
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<User>> {
        self.find_by_tenant(tenant_id).await
    }
}
