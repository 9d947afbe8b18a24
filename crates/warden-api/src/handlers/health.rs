//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use warden_core::traits::cache::CacheProvider;
use warden_core::traits::health::HealthCheck;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/v1/health
///
/// 503 when the session store or, if wired, the database is down.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let cache = async {
        match state.cache.health_check().await {
            Ok(up) => up,
            Err(e) => {
                tracing::warn!(error = %e, "Cache health check failed");
                false
            }
        }
    };
    let database = async {
        match state.database.as_deref() {
            Some(check) => Some(component_up(check).await),
            None => None,
        }
    };
    let (cache_up, database_up) = tokio::join!(cache, database);

    let healthy = cache_up && database_up.unwrap_or(true);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: up_down(cache_up),
        database: database_up.map(up_down),
    };
    (status, Json(ApiResponse::ok(body)))
}

async fn component_up(check: &dyn HealthCheck) -> bool {
    match check.check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(component = check.component(), error = %e, "Health check failed");
            false
        }
    }
}

fn up_down(up: bool) -> String {
    if up { "up" } else { "down" }.to_string()
}
