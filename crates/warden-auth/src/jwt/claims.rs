//! Access-token claim set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_entity::user::UserRole;

/// Claims payload embedded in every access token.
///
/// The field set is fixed. A valid signature only proves these claims were
/// issued by us; it says nothing about whether the session is still live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,
    /// Subject, the user ID.
    pub sub: Uuid,
    /// Session ID this token belongs to.
    pub sid: Uuid,
    /// Tenant of the user. `None` for platform users.
    pub tenant: Option<Uuid>,
    /// Role at issuance time.
    pub role: UserRole,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

impl Claims {
    /// Tenant id rendered for policy lookups. Empty for platform users.
    pub fn tenant_key(&self) -> String {
        self.tenant.map(|t| t.to_string()).unwrap_or_default()
    }
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// When the token stops verifying.
    pub expires_at: DateTime<Utc>,
}
