//! # warden-auth
//!
//! Session and token lifecycle for Warden.
//!
//! ## Modules
//!
//! - `jwt` — signed access-token issuance and verification
//! - `session` — session records in the cache, and the manager that
//!   drives login, validation, rotation, and revocation
//! - `password` — Argon2id password hashing
//! - `rbac` — tenant-scoped authorization gate over a policy store
//! - `directory` — the user-lookup port consumed by sign-in and refresh

pub mod directory;
pub mod error;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use directory::{MemoryUserDirectory, UserDirectory};
pub use error::{AuthError, AuthResult};
pub use jwt::{Claims, TokenCodec};
pub use password::PasswordHasher;
pub use rbac::{AuthorizationGate, MemoryPolicyStore, PolicyStore};
pub use session::{SessionManager, SessionStore};
