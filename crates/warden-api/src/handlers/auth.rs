//! Auth handlers: sign-in, refresh, logout, logout-all, sessions.

use axum::Json;
use axum::extract::State;

use warden_auth::session::{LogoutAllReport, SessionView, SignInResult, TokenPair};

use crate::dto::request::{RefreshRequest, SignInRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, BearerToken, ClientInfo, MaybeBearer, ValidatedJson};
use crate::state::AppState;

/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<SignInRequest>,
) -> Result<Json<ApiResponse<SignInResult>>, ApiError> {
    let result = state
        .session_manager
        .sign_in(&req.username, &req.password, &client.user_agent, &client.ip)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/v1/auth/refresh
///
/// The expired access token identifies the session; the refresh token
/// proves possession.
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientInfo,
    BearerToken(bearer): BearerToken,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let tokens = state
        .session_manager
        .refresh_session(&req.refresh_token, &bearer, &client.user_agent)
        .await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// POST /api/v1/auth/logout
///
/// Always succeeds, even without a usable token.
pub async fn logout(
    State(state): State<AppState>,
    MaybeBearer(bearer): MaybeBearer,
) -> Json<ApiResponse<MessageResponse>> {
    if let Some(token) = bearer {
        state.session_manager.logout_bearer(&token).await;
    }
    Json(ApiResponse::ok(MessageResponse::new("Logged out")))
}

/// POST /api/v1/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<LogoutAllReport>>, ApiError> {
    let report = state.session_manager.logout_all(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/v1/auth/sessions
pub async fn sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SessionView>>>, ApiError> {
    let sessions = state
        .session_manager
        .list_sessions(auth.user_id, Some(auth.session_id))
        .await?;
    Ok(Json(ApiResponse::ok(sessions)))
}
