//! # warden-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! repositories that back the user directory and the policy store.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod seed;

pub use connection::DatabasePool;
