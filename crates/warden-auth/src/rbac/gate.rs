//! Allow/deny decisions for authenticated requests.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use warden_core::result::AppResult;
use warden_entity::policy::{AccessRequest, GroupingRule, PolicyRule};

use super::policies::default_tenant_policies;
use super::store::PolicyStore;
use crate::jwt::Claims;

/// Default bound on a single policy lookup.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Fail-closed authorization gate over a [`PolicyStore`].
///
/// Any store error, timeout, or absence of a matching rule is a deny.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    store: Arc<dyn PolicyStore>,
    timeout: Duration,
}

impl AuthorizationGate {
    /// Creates a gate over a policy store.
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the lookup deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Decide whether `subject` may perform `action` on `resource` in `tenant`.
    pub async fn enforce(&self, subject: &str, tenant: &str, resource: &str, action: &str) -> bool {
        self.decide(AccessRequest {
            subject,
            role: None,
            tenant,
            resource,
            action,
        })
        .await
    }

    /// Decide for a verified identity, also honouring the role in its claims.
    pub async fn authorize(&self, claims: &Claims, resource: &str, action: &str) -> bool {
        let subject = claims.sub.to_string();
        let tenant = claims.tenant_key();
        self.decide(AccessRequest {
            subject: &subject,
            role: Some(claims.role.as_str()),
            tenant: &tenant,
            resource,
            action,
        })
        .await
    }

    async fn decide(&self, request: AccessRequest<'_>) -> bool {
        match tokio::time::timeout(self.timeout, self.store.enforce(&request)).await {
            Ok(Ok(true)) => true,
            Ok(Ok(false)) => {
                debug!(
                    subject = request.subject,
                    tenant = request.tenant,
                    resource = request.resource,
                    action = request.action,
                    "Access denied: no matching policy"
                );
                false
            }
            Ok(Err(e)) => {
                warn!(subject = request.subject, error = %e, "Access denied: policy store error");
                false
            }
            Err(_) => {
                warn!(subject = request.subject, "Access denied: policy store timed out");
                false
            }
        }
    }

    /// Bind a user to a role in a tenant.
    pub async fn add_role_to_user(&self, user: &str, role: &str, tenant: &str) -> AppResult<bool> {
        self.store
            .add_grouping_policy(GroupingRule::new(user, role, tenant))
            .await
    }

    /// Grant a single policy rule.
    pub async fn add_policy(&self, rule: PolicyRule) -> AppResult<bool> {
        self.store.add_policy(rule).await
    }

    /// Revoke a single policy rule.
    pub async fn remove_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        self.store.remove_policy(rule).await
    }

    /// Install the standard role policies for a tenant.
    pub async fn setup_default_policies(&self, tenant: &str) -> AppResult<()> {
        for rule in default_tenant_policies(tenant) {
            self.store.add_policy(rule).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use uuid::Uuid;

    use warden_core::error::AppError;
    use warden_entity::user::UserRole;

    use super::*;
    use crate::rbac::store::MemoryPolicyStore;

    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl PolicyStore for BrokenStore {
        async fn enforce(&self, _request: &AccessRequest<'_>) -> AppResult<bool> {
            Err(AppError::database("policy table unavailable"))
        }
        async fn add_policy(&self, _rule: PolicyRule) -> AppResult<bool> {
            Err(AppError::database("policy table unavailable"))
        }
        async fn remove_policy(&self, _rule: &PolicyRule) -> AppResult<bool> {
            Err(AppError::database("policy table unavailable"))
        }
        async fn add_grouping_policy(&self, _rule: GroupingRule) -> AppResult<bool> {
            Err(AppError::database("policy table unavailable"))
        }
    }

    fn claims(sub: Uuid, tenant: Uuid, role: UserRole) -> Claims {
        Claims {
            iss: "warden".into(),
            sub,
            sid: Uuid::new_v4(),
            tenant: Some(tenant),
            role,
            iat: 0,
            exp: i64::MAX,
            jti: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_default_policies_by_grouping() {
        let gate = AuthorizationGate::new(Arc::new(MemoryPolicyStore::new()));
        let tenant = Uuid::new_v4().to_string();
        let user = Uuid::new_v4().to_string();
        gate.setup_default_policies(&tenant).await.unwrap();
        gate.add_role_to_user(&user, "doctor", &tenant).await.unwrap();

        assert!(gate.enforce(&user, &tenant, "/api/v1/patients", "GET").await);
        assert!(!gate.enforce(&user, &tenant, "/api/v1/patients", "DELETE").await);
        assert!(!gate.enforce(&user, "other", "/api/v1/patients", "GET").await);
    }

    #[tokio::test]
    async fn test_authorize_uses_claim_role() {
        let gate = AuthorizationGate::new(Arc::new(MemoryPolicyStore::new()));
        let tenant = Uuid::new_v4();
        gate.setup_default_policies(&tenant.to_string()).await.unwrap();

        let owner = claims(Uuid::new_v4(), tenant, UserRole::Owner);
        assert!(gate.authorize(&owner, "/api/v1/anything/at/all", "DELETE").await);
        let nurse = claims(Uuid::new_v4(), tenant, UserRole::Nurse);
        assert!(gate.authorize(&nurse, "/api/v1/test/nurse", "GET").await);
        assert!(!gate.authorize(&nurse, "/api/v1/test/owner", "GET").await);
    }

    #[tokio::test]
    async fn test_removed_rule_stops_granting() {
        let gate = AuthorizationGate::new(Arc::new(MemoryPolicyStore::new()));
        let tenant = Uuid::new_v4();
        let rule = PolicyRule::new("role:nurse", tenant.to_string(), "/api/v1/vitals", "POST");
        gate.add_policy(rule.clone()).await.unwrap();
        let nurse = claims(Uuid::new_v4(), tenant, UserRole::Nurse);
        assert!(gate.authorize(&nurse, "/api/v1/vitals", "POST").await);

        assert!(gate.remove_policy(&rule).await.unwrap());
        assert!(!gate.remove_policy(&rule).await.unwrap());
        assert!(!gate.authorize(&nurse, "/api/v1/vitals", "POST").await);
    }

    #[tokio::test]
    async fn test_store_error_denies() {
        let gate = AuthorizationGate::new(Arc::new(BrokenStore));
        assert!(!gate.enforce("u", "t", "/api/v1/x", "GET").await);
    }
}
