//! Tenant domain entities.

pub mod model;

pub use model::{CreateTenant, Tenant};
