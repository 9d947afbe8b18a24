//! Embedded schema migrations.

use sqlx::PgPool;
use sqlx::migrate::Migrator;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;

/// Tenants, users and policy rules, compiled into the binary.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Bring the schema up to the newest embedded version.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();
    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Schema migration to version {latest} failed"),
            e,
        )
    })?;

    tracing::info!(version = latest, "Schema up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_are_ordered() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert_eq!(versions.len(), 2);
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_embedded_migrations_cover_directory_and_policies() {
        let names: Vec<&str> = MIGRATOR.iter().map(|m| m.description.as_ref()).collect();
        assert!(names.iter().any(|n| n.contains("users")));
        assert!(names.iter().any(|n| n.contains("policy")));
    }
}
