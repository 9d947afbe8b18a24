//! Bearer-token extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tower_http::request_id::RequestId;
use uuid::Uuid;

use warden_auth::Claims;
use warden_core::error::AppError;
use warden_entity::user::UserRole;

use super::client::ClientInfo;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity of an authenticated caller.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Caller's user id.
    pub user_id: Uuid,
    /// Caller's session id.
    pub session_id: Uuid,
    /// Role carried by the access token.
    pub role: UserRole,
    /// Caller's tenant. `None` for platform users.
    pub tenant_id: Option<Uuid>,
    /// Client IP.
    pub client_ip: String,
    /// Client User-Agent.
    pub user_agent: String,
    /// Request correlation id.
    pub request_id: String,
    /// Verified claims.
    pub claims: Claims,
}

/// Authenticated caller. Rejects with 401/403 unless the bearer token
/// passes full access validation.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Raw bearer token, required but not verified.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Raw bearer token if present, not verified.
#[derive(Debug, Clone)]
pub struct MaybeBearer(pub Option<String>);

fn bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Correlation id assigned by the request-id layer.
pub fn request_id(parts: &Parts) -> String {
    parts
        .extensions
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer(parts)
            .map(|t| Self(t.to_string()))
            .ok_or_else(|| AppError::authentication("Missing bearer token").into())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeBearer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer(parts).map(str::to_string)))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by the authorization middleware.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer(parts).ok_or_else(|| AppError::authentication("Missing bearer token"))?;
        let claims = state.session_manager.validate_access(token).await?;
        let client = ClientInfo::resolve(parts, &state.config.server.trusted_proxies);

        let user = AuthUser(RequestContext {
            user_id: claims.sub,
            session_id: claims.sid,
            role: claims.role,
            tenant_id: claims.tenant,
            client_ip: client.ip,
            user_agent: client.user_agent,
            request_id: request_id(parts),
            claims,
        });
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
