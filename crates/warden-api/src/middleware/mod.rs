//! Axum middleware stack.

pub mod authorize;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod report;
