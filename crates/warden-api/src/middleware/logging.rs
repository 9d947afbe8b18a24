//! Access log.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tower_http::request_id::RequestId;

/// One line per request. Server errors log at `warn`; the report
/// middleware already raised an alert for them.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or_default()
        .to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if response.status().is_server_error() {
        tracing::warn!(%method, %path, %request_id, status, elapsed_ms, "Request failed");
    } else {
        tracing::info!(%method, %path, %request_id, status, elapsed_ms, "Request served");
    }

    response
}
