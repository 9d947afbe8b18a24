//! Core traits defined in `warden-core` and implemented by other crates.

pub mod alert;
pub mod cache;
pub mod health;

pub use alert::{AlertSink, NoopAlertSink};
pub use cache::CacheProvider;
pub use health::HealthCheck;
