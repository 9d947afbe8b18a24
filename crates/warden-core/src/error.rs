//! Unified application error types for Warden.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The session-specific kinds mirror
//! the typed session errors one-to-one so callers can branch on the kind
//! without parsing messages.

use std::fmt;
use thiserror::Error;

/// Failure category. Decides the HTTP status, the wire code and whether
/// the message may reach a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No such user, tenant or route.
    NotFound,
    /// Missing or unusable bearer credentials.
    Authentication,
    /// The policy gate denied the request.
    Authorization,
    /// Request body or query failed validation.
    Validation,
    /// Unique constraint hit, e.g. a taken username.
    Conflict,
    /// Sign-in or refresh budget spent for this client.
    RateLimit,
    /// Bug or broken invariant.
    Internal,
    /// PostgreSQL failure.
    Database,
    /// Session store failure outside a session operation.
    Cache,
    /// Settings are missing or inconsistent.
    Configuration,
    /// JSON encoding or decoding failed.
    Serialization,
    /// The token could not be parsed or its signature is invalid.
    TokenMalformed,
    /// The token parsed and verified but is past its expiry.
    TokenExpired,
    /// The session no longer exists or was rejected.
    SessionRevoked,
    /// The presented refresh token does not match the stored one.
    SessionMismatch,
    /// The user carries a block flag or is inactive.
    AccountBlocked,
    /// Username/password did not verify.
    InvalidCredentials,
    /// The session store was unreachable or timed out.
    Transient,
    /// The token could not be signed.
    Signing,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Authentication => "AUTH_TOKEN_INVALID",
            Self::Authorization => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::RateLimit => "RATE_LIMITED",
            Self::Internal => "INTERNAL_ERROR",
            Self::Database => "DATABASE_ERROR",
            Self::Cache => "CACHE_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::TokenMalformed => "AUTH_TOKEN_INVALID",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::SessionRevoked => "SESSION_REVOKED",
            Self::SessionMismatch => "SESSION_MISMATCH",
            Self::AccountBlocked => "ACCOUNT_BLOCKED",
            Self::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::Transient => "TRANSIENT",
            Self::Signing => "SIGNING_ERROR",
        }
    }

    /// Whether details of this kind must be hidden from API clients.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal
                | Self::Database
                | Self::Cache
                | Self::Configuration
                | Self::Serialization
                | Self::Signing
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error value every Warden crate converts into before crossing a crate
/// boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Category.
    pub kind: ErrorKind,
    /// Operator-facing message. Hidden from clients for internal kinds.
    pub message: String,
    /// Underlying cause, kept for logs.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a rate-limit error.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_kinds_have_distinct_codes() {
        let kinds = [
            ErrorKind::TokenExpired,
            ErrorKind::SessionRevoked,
            ErrorKind::SessionMismatch,
            ErrorKind::AccountBlocked,
            ErrorKind::InvalidCredentials,
            ErrorKind::Transient,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_internal_kinds_hidden() {
        assert!(ErrorKind::Database.is_internal());
        assert!(ErrorKind::Signing.is_internal());
        assert!(!ErrorKind::SessionMismatch.is_internal());
        assert!(!ErrorKind::Transient.is_internal());
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::new(ErrorKind::Transient, "redis down");
        assert_eq!(err.to_string(), "TRANSIENT: redis down");
    }
}
