//! Administrative account controls.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::dto::request::BlockQuery;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedQuery};
use crate::state::AppState;

/// POST /api/v1/admin/users/{id}/block
pub async fn block_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    ValidatedQuery(query): ValidatedQuery<BlockQuery>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let ttl = query.ttl_seconds.map(Duration::from_secs);
    state.session_manager.block_user(user_id, ttl).await?;
    tracing::info!(admin_id = %auth.user_id, user_id = %user_id, "Admin blocked user");
    Ok(Json(ApiResponse::ok(MessageResponse::new("User blocked"))))
}

/// DELETE /api/v1/admin/users/{id}/block
pub async fn unblock_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.session_manager.unblock_user(user_id).await?;
    tracing::info!(admin_id = %auth.user_id, user_id = %user_id, "Admin unblocked user");
    Ok(Json(ApiResponse::ok(MessageResponse::new("User unblocked"))))
}
