//! Default policy set of a newly created tenant.

use warden_entity::policy::PolicyRule;
use warden_entity::policy::rule::{ROLE_PREFIX, WILDCARD};
use warden_entity::user::UserRole;

/// Rules granted to the standard clinic roles of `tenant`.
///
/// The owner may read, create, and delete anything under `/api/v1/`;
/// clinical roles get narrow grants on their own resources.
pub fn default_tenant_policies(tenant: &str) -> Vec<PolicyRule> {
    let role = |name: &str| format!("{ROLE_PREFIX}{name}");
    vec![
        PolicyRule::new(role("owner"), tenant, "/api/v1/*", "GET"),
        PolicyRule::new(role("owner"), tenant, "/api/v1/*", "POST"),
        PolicyRule::new(role("owner"), tenant, "/api/v1/*", "DELETE"),
        PolicyRule::new(role("doctor"), tenant, "/api/v1/patients", "GET"),
        PolicyRule::new(role("doctor"), tenant, "/api/v1/appointments", "POST"),
        PolicyRule::new(role("nurse"), tenant, "/api/v1/patients", "GET"),
        PolicyRule::new(role("nurse"), tenant, "/api/v1/vitals", "POST"),
        PolicyRule::new(role("owner"), tenant, "/api/v1/test/owner", "GET"),
        PolicyRule::new(role("doctor"), tenant, "/api/v1/test/doctor", "GET"),
        PolicyRule::new(role("nurse"), tenant, "/api/v1/test/nurse", "GET"),
    ]
}

/// Platform-wide grants: the super administrator may do anything under
/// `/api/v1/` in every tenant.
pub fn platform_policies() -> Vec<PolicyRule> {
    let subject = format!("{ROLE_PREFIX}{}", UserRole::SuperAdmin.as_str());
    vec![PolicyRule::new(subject, WILDCARD, "/api/v1/*", WILDCARD)]
}
