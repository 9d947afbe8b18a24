//! Server-error reporting.

use axum::Json;
use axum::extract::{OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::request_id::RequestId;

use warden_worker::escape_html;

use crate::error::{ErrorReport, error_body};
use crate::state::AppState;

/// Pushes an alert for every response with status >= 500 and, when
/// `server.expose_error_details` is set, restores internal error details
/// in the body.
pub async fn report_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or_default()
        .to_string();

    let response = next.run(request).await;
    let status = response.status();
    let report = response.extensions().get::<ErrorReport>().cloned();

    if status.is_server_error() {
        let mut message = format!(
            "🚨 <b>CRITICAL ERROR</b>\n\n🆔 <b>RequestID:</b> <code>{}</code>\n🔢 <b>Status:</b> {}\n🛣 <b>Path:</b> {} {}",
            escape_html(&request_id),
            status.as_u16(),
            method,
            escape_html(&path),
        );
        if let Some(report) = &report {
            message.push_str(&format!(
                "\n❌ <b>Error:</b> <pre>{}</pre>",
                escape_html(&report.detail)
            ));
        }
        state.alerts.send(message);
    }

    let Some(report) = report else {
        return response;
    };

    if state.config.server.expose_error_details && report.kind.is_internal() {
        let (mut parts, _) = response.into_parts();
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        let body = Json(error_body(report.kind, &report.detail, true));
        return (parts, body).into_response();
    }

    response
}
