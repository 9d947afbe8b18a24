//! Housekeeping job implementations.

pub mod cache_probe;
pub mod session_sweep;

pub use cache_probe::CacheProbeJob;
pub use session_sweep::SessionSweepJob;
