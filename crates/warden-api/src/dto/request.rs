//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sign-in request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    /// Username.
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token issued at sign-in or by the previous refresh.
    #[validate(length(min = 1, max = 512, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Query of `POST /admin/users/{id}/block`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BlockQuery {
    /// Block duration in seconds. Absent blocks until cleared.
    #[validate(range(min = 1, message = "ttl_seconds must be positive; omit it to block until cleared"))]
    pub ttl_seconds: Option<u64>,
}
