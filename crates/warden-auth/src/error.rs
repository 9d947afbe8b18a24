//! Typed failures of the session subsystem.

use thiserror::Error;

use warden_core::error::{AppError, ErrorKind};

/// Every way a session or token operation can fail.
///
/// Domain failures are returned as values from the session manager; only
/// [`AuthError::Transient`] reflects infrastructure trouble and is the only
/// kind a caller may consider retrying (never for refresh).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Token could not be parsed, or its signature did not verify.
    #[error("token is malformed or has an invalid signature")]
    TokenMalformed,
    /// Token verified but is past its expiry.
    #[error("token has expired")]
    TokenExpired,
    /// Session record is absent, or the refresh came from a different client.
    #[error("session has been revoked")]
    SessionRevoked,
    /// A stale or foreign refresh token was presented; the session is gone.
    #[error("refresh token does not match the session")]
    SessionMismatch,
    /// The user is blocked or inactive.
    #[error("account is blocked")]
    AccountBlocked,
    /// Sign-in credentials did not verify.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// A caller-supplied argument is outside its allowed range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The session store was unreachable or exceeded its deadline.
    #[error("session store unavailable: {0}")]
    Transient(String),
    /// The signing key is unusable.
    #[error("token signing failed: {0}")]
    Signing(String),
    /// Unexpected failure of a collaborator other than the session store.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for session-subsystem operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// The matching application error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TokenMalformed => ErrorKind::TokenMalformed,
            Self::TokenExpired => ErrorKind::TokenExpired,
            Self::SessionRevoked => ErrorKind::SessionRevoked,
            Self::SessionMismatch => ErrorKind::SessionMismatch,
            Self::AccountBlocked => ErrorKind::AccountBlocked,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::Transient(_) => ErrorKind::Transient,
            Self::Signing(_) => ErrorKind::Signing,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}

impl From<AppError> for AuthError {
    /// Infrastructure errors crossing into the session subsystem.
    fn from(err: AppError) -> Self {
        match err.kind {
            ErrorKind::Cache | ErrorKind::Transient => {
                Self::Transient(err.message)
            }
            _ => Self::Internal(err.message),
        }
    }
}
