//! Repository implementations for data access.

pub mod policy;
pub mod tenant;
pub mod user;

pub use policy::PgPolicyStore;
pub use tenant::TenantRepository;
pub use user::UserRepository;
