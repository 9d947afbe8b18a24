//! Policy rules persisted in PostgreSQL.
//!
//! Rules are loaded once into memory and evaluated there; every mutation
//! is written to the table first, then applied to the in-memory set.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use warden_auth::{MemoryPolicyStore, PolicyStore};
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_entity::policy::{AccessRequest, GroupingRule, PolicyRule, PolicySet};

const POLICY: &str = "p";
const GROUPING: &str = "g";

/// Write-through policy store over the `policy_rules` table.
#[derive(Debug, Clone)]
pub struct PgPolicyStore {
    pool: PgPool,
    cache: MemoryPolicyStore,
}

impl PgPolicyStore {
    /// Load every rule from the table.
    pub async fn load(pool: PgPool) -> AppResult<Self> {
        let set = Self::fetch_all(&pool).await?;
        info!(
            policies = set.policy_count(),
            groupings = set.grouping_count(),
            "Loaded policy rules"
        );
        Ok(Self {
            pool,
            cache: MemoryPolicyStore::with_rules(set),
        })
    }

    async fn fetch_all(pool: &PgPool) -> AppResult<PolicySet> {
        let rows = sqlx::query_as::<_, (String, String, String, String, String)>(
            "SELECT ptype, v0, v1, v2, v3 FROM policy_rules",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load policies", e))?;

        let mut set = PolicySet::new();
        for (ptype, v0, v1, v2, v3) in rows {
            match ptype.as_str() {
                POLICY => {
                    set.add_policy(PolicyRule::new(v0, v1, v2, v3));
                }
                GROUPING => {
                    set.add_grouping(GroupingRule::new(v0, v1, v2));
                }
                other => tracing::warn!(ptype = other, "Skipping unknown policy row"),
            }
        }
        Ok(set)
    }

    async fn insert_row(&self, ptype: &str, values: [&str; 4]) -> AppResult<bool> {
        let result = sqlx::query(
            r#"INSERT INTO policy_rules (ptype, v0, v1, v2, v3)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(ptype)
        .bind(values[0])
        .bind(values[1])
        .bind(values[2])
        .bind(values[3])
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save policy", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PolicyStore for PgPolicyStore {
    async fn enforce(&self, request: &AccessRequest<'_>) -> AppResult<bool> {
        self.cache.enforce(request).await
    }

    async fn add_policy(&self, rule: PolicyRule) -> AppResult<bool> {
        let inserted = self
            .insert_row(
                POLICY,
                [
                    rule.subject.as_str(),
                    rule.tenant.as_str(),
                    rule.resource.as_str(),
                    rule.action.as_str(),
                ],
            )
            .await?;
        self.cache.add_policy(rule).await?;
        Ok(inserted)
    }

    async fn remove_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM policy_rules WHERE ptype = $1 AND v0 = $2 AND v1 = $3 AND v2 = $4 AND v3 = $5",
        )
        .bind(POLICY)
        .bind(&rule.subject)
        .bind(&rule.tenant)
        .bind(&rule.resource)
        .bind(&rule.action)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove policy", e))?;
        self.cache.remove_policy(rule).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_grouping_policy(&self, rule: GroupingRule) -> AppResult<bool> {
        let inserted = self
            .insert_row(GROUPING, [rule.user.as_str(), rule.role.as_str(), rule.tenant.as_str(), ""])
            .await?;
        self.cache.add_grouping_policy(rule).await?;
        Ok(inserted)
    }
}
