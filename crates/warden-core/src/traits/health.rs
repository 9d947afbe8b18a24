//! Readiness checks for backing services.

use async_trait::async_trait;

use crate::result::AppResult;

/// A dependency that `/health` can ask "are you there?".
#[async_trait]
pub trait HealthCheck: Send + Sync + std::fmt::Debug + 'static {
    /// Short stable name used as the key in health output.
    fn component(&self) -> &'static str;

    /// Round-trip to the dependency. `Err` means down.
    async fn check(&self) -> AppResult<()>;
}
