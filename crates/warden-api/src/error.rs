//! Maps domain errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use warden_auth::AuthError;
use warden_core::error::{AppError, ErrorKind};

/// Message shown instead of the details of an internal failure.
pub const OPAQUE_MESSAGE: &str = "An internal error occurred";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub code: String,
    /// Error detail. Opaque for internal failures.
    pub error: String,
    /// Human-readable summary of the code.
    pub message: String,
}

/// The unredacted failure, attached to the response for middleware.
///
/// Never serialized to the client.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Error kind.
    pub kind: ErrorKind,
    /// Full error message.
    pub detail: String,
}

/// Handler error wrapper so that [`AppError`] can become a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Authentication
        | ErrorKind::TokenMalformed
        | ErrorKind::TokenExpired
        | ErrorKind::SessionRevoked
        | ErrorKind::SessionMismatch
        | ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ErrorKind::Authorization | ErrorKind::AccountBlocked => StatusCode::FORBIDDEN,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Cache
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Signing => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Human-readable summary for an error kind.
pub fn summary_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "Resource not found",
        ErrorKind::Authentication | ErrorKind::TokenMalformed => "Invalid access token",
        ErrorKind::TokenExpired => "Access token has expired",
        ErrorKind::SessionRevoked => "Session is no longer valid",
        ErrorKind::SessionMismatch => "Refresh token reuse detected",
        ErrorKind::InvalidCredentials => "Invalid username or password",
        ErrorKind::AccountBlocked => "Account is blocked",
        ErrorKind::Authorization => "Permission denied",
        ErrorKind::Validation => "Invalid parameters or input",
        ErrorKind::Conflict => "Resource already exists",
        ErrorKind::RateLimit => "Too many requests",
        ErrorKind::Transient => "Service temporarily unavailable",
        _ => "Internal server error",
    }
}

/// Build the error body, hiding internal details unless `expose` is set.
pub fn error_body(kind: ErrorKind, detail: &str, expose: bool) -> ApiErrorBody {
    let error = if kind.is_internal() && !expose {
        OPAQUE_MESSAGE.to_string()
    } else {
        detail.to_string()
    };
    ApiErrorBody {
        success: false,
        code: kind.code().to_string(),
        error,
        message: summary_for(kind).to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind;
        let status = status_for(kind);
        if status.is_server_error() {
            tracing::error!(code = kind.code(), error = %self.0, "Request failed");
        } else {
            tracing::debug!(code = kind.code(), error = %self.0.message, "Request rejected");
        }

        let mut response = (status, Json(error_body(kind, &self.0.message, false))).into_response();
        response.extensions_mut().insert(ErrorReport {
            kind,
            detail: self.0.message,
        });
        response
    }
}
