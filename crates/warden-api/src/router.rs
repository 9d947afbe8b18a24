//! Route definitions for the Warden HTTP API.
//!
//! All routes are mounted under `/api/v1`. Routes fall in three groups:
//! open, authenticated, and authenticated plus authorized by the policy
//! gate on `(path, method)`.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(credential_routes(state.clone()))
        .merge(session_routes())
        .merge(authorized_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::report::report_errors,
        ))
        .merge(health_routes());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum_middleware::from_fn(middleware::logging::request_logging))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Sign-in, refresh, and logout: open, sign-in and refresh rate-limited.
fn credential_routes(state: AppState) -> Router<AppState> {
    let limited = Router::new()
        .route("/auth/sign-in", post(handlers::auth::sign_in))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::rate_limit::limit_auth,
        ));

    limited.route("/auth/logout", post(handlers::auth::logout))
}

/// Endpoints any authenticated caller may use on their own account.
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout-all", post(handlers::auth::logout_all))
        .route("/auth/sessions", get(handlers::auth::sessions))
        .route("/users/me", get(handlers::user::me))
}

/// Endpoints guarded by the policy gate.
fn authorized_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::user::list))
        .route(
            "/admin/users/{id}/block",
            post(handlers::admin::block_user).delete(handlers::admin::unblock_user),
        )
        .route("/test/{role}", get(handlers::probe::role_probe))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::authorize::authorize,
        ))
}

/// Liveness and cache health.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
