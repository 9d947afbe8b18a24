//! # warden-entity
//!
//! Domain entity models for Warden. Database-backed structs derive
//! `sqlx::FromRow`; the session record and policy rules are value objects
//! stored in the cache and policy tables respectively.

pub mod policy;
pub mod session;
pub mod tenant;
pub mod user;
