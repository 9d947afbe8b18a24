//! Removal of session records whose expiry has passed.

use warden_auth::SessionStore;
use warden_auth::session::SweepReport;
use warden_core::result::AppResult;

/// Sweeps expired session records out of the cache.
///
/// Redis drops them on its own; this catches records written without a
/// TTL and providers that lose TTLs on restore.
#[derive(Debug, Clone)]
pub struct SessionSweepJob {
    store: SessionStore,
}

impl SessionSweepJob {
    /// Create a sweep job over a session store.
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Run one sweep.
    pub async fn run(&self) -> AppResult<SweepReport> {
        tracing::debug!("Running expired session sweep");
        let report = self.store.sweep_expired().await?;
        if report.removed > 0 {
            tracing::info!(
                scanned = report.scanned,
                removed = report.removed,
                "Expired sessions removed"
            );
        }
        Ok(report)
    }
}
