//! Server-side session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The server-side state of one logged-in device.
///
/// Stored as compact JSON under `user:<user_id>:session:<session_id>`. The
/// record's shape is fixed: unknown fields are rejected when reading so that
/// a foreign writer cannot smuggle data into the session namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionRecord {
    /// Current refresh token. Rotated on every successful refresh.
    #[serde(rename = "rt")]
    pub refresh_token: String,
    /// User-Agent observed at login.
    #[serde(rename = "ua")]
    pub user_agent: String,
    /// Client IP observed at login.
    #[serde(rename = "ip")]
    pub client_ip: String,
    /// When the session was first created.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// When the current refresh token stops being usable.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the record's own expiry has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
