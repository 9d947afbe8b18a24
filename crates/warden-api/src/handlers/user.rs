//! User handlers.

use axum::Json;
use axum::extract::State;

use warden_core::error::AppError;
use warden_entity::user::User;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .users
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(ApiResponse::ok(user)))
}

/// GET /api/v1/users
///
/// Users of the caller's tenant.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let tenant_id = auth
        .tenant_id
        .ok_or_else(|| AppError::validation("Caller does not belong to a tenant"))?;
    let users = state.users.list_by_tenant(tenant_id).await?;
    tracing::debug!(tenant_id = %tenant_id, count = users.len(), "Listed users");
    Ok(Json(ApiResponse::ok(users)))
}
