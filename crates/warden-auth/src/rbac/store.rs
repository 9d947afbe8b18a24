//! Policy store port and its in-memory adapter.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use warden_core::result::AppResult;
use warden_entity::policy::{AccessRequest, GroupingRule, PolicyRule, PolicySet};

/// Source of authorization rules.
#[async_trait]
pub trait PolicyStore: Send + Sync + std::fmt::Debug + 'static {
    /// Decide a request.
    async fn enforce(&self, request: &AccessRequest<'_>) -> AppResult<bool>;

    /// Add a policy rule. Returns `false` if it already existed.
    async fn add_policy(&self, rule: PolicyRule) -> AppResult<bool>;

    /// Remove a policy rule. Returns `false` if it did not exist.
    async fn remove_policy(&self, rule: &PolicyRule) -> AppResult<bool>;

    /// Bind a user to a role within a tenant. Returns `false` if already bound.
    async fn add_grouping_policy(&self, rule: GroupingRule) -> AppResult<bool>;
}

/// Policy store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPolicyStore {
    set: Arc<RwLock<PolicySet>>,
}

impl MemoryPolicyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with rules.
    pub fn with_rules(set: PolicySet) -> Self {
        Self {
            set: Arc::new(RwLock::new(set)),
        }
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn enforce(&self, request: &AccessRequest<'_>) -> AppResult<bool> {
        Ok(self.set.read().await.enforce(request))
    }

    async fn add_policy(&self, rule: PolicyRule) -> AppResult<bool> {
        Ok(self.set.write().await.add_policy(rule))
    }

    async fn remove_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        Ok(self.set.write().await.remove_policy(rule))
    }

    async fn add_grouping_policy(&self, rule: GroupingRule) -> AppResult<bool> {
        Ok(self.set.write().await.add_grouping(rule))
    }
}
