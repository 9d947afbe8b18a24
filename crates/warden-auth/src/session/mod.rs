//! Session lifecycle: records in the cache and the manager that drives
//! login, validation, rotation, and revocation.

pub mod manager;
pub mod store;
pub mod token;

pub use manager::{LogoutAllReport, SessionManager, SessionView, SignInResult, TokenPair, UserSummary};
pub use store::{SessionStore, SweepReport};
