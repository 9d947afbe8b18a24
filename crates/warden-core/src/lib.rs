//! # warden-core
//!
//! Configuration schemas, the unified error type, and the seams other
//! crates plug into: cache providers, alert sinks and health checks.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
