//! Tenant-scoped authorization.

pub mod gate;
pub mod policies;
pub mod store;

pub use gate::AuthorizationGate;
pub use policies::{default_tenant_policies, platform_policies};
pub use store::{MemoryPolicyStore, PolicyStore};
