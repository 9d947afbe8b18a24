//! Role probes under `/api/v1/test/`. Reaching the handler means the
//! authorization middleware granted access.

use axum::Json;
use axum::extract::Path;

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::AuthUser;

/// GET /api/v1/test/{role}
pub async fn role_probe(
    auth: AuthUser,
    Path(role): Path<String>,
) -> Json<ApiResponse<MessageResponse>> {
    Json(ApiResponse::ok(MessageResponse::new(format!(
        "Access to the {role} area granted to {}",
        auth.role
    ))))
}
