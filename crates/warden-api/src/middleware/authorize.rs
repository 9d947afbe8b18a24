//! Policy check for protected routes.

use axum::extract::{FromRequestParts, OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use warden_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Authenticates the caller, then asks the gate whether the caller may
/// perform the request method on the request path within their tenant.
///
/// The resolved [`AuthUser`] is stored in the request extensions for the
/// handler.
pub async fn authorize(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &state).await?;

    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    let method = parts.method.as_str();

    if !state.gate.authorize(&user.claims, &path, method).await {
        tracing::info!(
            user_id = %user.user_id,
            tenant = ?user.tenant_id,
            path = %path,
            method,
            "Permission denied"
        );
        return Err(AppError::authorization("Permission denied").into());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
