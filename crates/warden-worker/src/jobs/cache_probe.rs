//! Periodic cache health probe.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use warden_cache::CacheManager;
use warden_core::traits::alert::AlertSink;
use warden_core::traits::cache::CacheProvider;

/// Pings the cache and alerts on transitions between healthy and unhealthy.
#[derive(Debug)]
pub struct CacheProbeJob {
    cache: Arc<CacheManager>,
    alerts: Arc<dyn AlertSink>,
    healthy: AtomicBool,
}

impl CacheProbeJob {
    /// Create a probe. The cache is assumed healthy until the first failure.
    pub fn new(cache: Arc<CacheManager>, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            cache,
            alerts,
            healthy: AtomicBool::new(true),
        }
    }

    /// Probe once and return whether the cache answered.
    pub async fn run(&self) -> bool {
        let healthy = match self.cache.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(error = %e, "Cache health check failed");
                false
            }
        };

        let was_healthy = self.healthy.swap(healthy, Ordering::SeqCst);
        match (was_healthy, healthy) {
            (true, false) => self
                .alerts
                .send("🚨 <b>CACHE UNAVAILABLE</b>\n\nSession operations are failing.".into()),
            (false, true) => self.alerts.send("✅ <b>CACHE RECOVERED</b>".into()),
            _ => {}
        }
        healthy
    }
}
