//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use warden_auth::{AuthorizationGate, SessionManager, UserDirectory};
use warden_cache::CacheManager;
use warden_core::config::AppConfig;
use warden_core::traits::alert::AlertSink;
use warden_core::traits::health::HealthCheck;

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Cache manager (Redis or in-memory).
    pub cache: Arc<CacheManager>,
    /// Session lifecycle manager.
    pub session_manager: Arc<SessionManager>,
    /// Tenant-scoped authorization gate.
    pub gate: Arc<AuthorizationGate>,
    /// User lookup.
    pub users: Arc<dyn UserDirectory>,
    /// Operational alerts.
    pub alerts: Arc<dyn AlertSink>,
    /// Per-client limiter for sign-in and refresh.
    pub auth_limiter: RateLimiter,
    /// Database readiness, reported by `/health` when present.
    pub database: Option<Arc<dyn HealthCheck>>,
}

impl AppState {
    /// Assemble the state, deriving the rate limiter from configuration.
    pub fn new(
        config: Arc<AppConfig>,
        cache: Arc<CacheManager>,
        session_manager: Arc<SessionManager>,
        gate: Arc<AuthorizationGate>,
        users: Arc<dyn UserDirectory>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let auth_limiter = RateLimiter::per_minute(config.server.auth_rate_per_minute);
        Self {
            config,
            cache,
            session_manager,
            gate,
            users,
            alerts,
            auth_limiter,
            database: None,
        }
    }

    /// Include the database in health reporting.
    pub fn with_database(mut self, database: Arc<dyn HealthCheck>) -> Self {
        self.database = Some(database);
        self
    }
}
