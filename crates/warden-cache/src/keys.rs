//! Cache key builders for the session namespace.
//!
//! Centralising key construction keeps the layout in one place:
//!
//! - `user:<user_id>:session:<session_id>` holds one session record
//! - `user:blocked:<user_id>` holds a block flag

use uuid::Uuid;

/// Literal value stored in a block flag.
pub const BLOCK_FLAG_VALUE: &str = "1";

/// Prefix shared by every session and block-flag key.
pub const USER_NAMESPACE: &str = "user:";

/// Key of one session record.
pub fn session(user_id: Uuid, session_id: Uuid) -> String {
    format!("user:{user_id}:session:{session_id}")
}

/// Prefix matching every session of one user.
pub fn user_sessions_prefix(user_id: Uuid) -> String {
    format!("user:{user_id}:session:")
}

/// Key of a user's block flag.
pub fn blocked(user_id: Uuid) -> String {
    format!("user:blocked:{user_id}")
}

/// Parse a session key back into `(user_id, session_id)`.
///
/// Returns `None` for block flags and anything else outside the layout.
pub fn parse_session(key: &str) -> Option<(Uuid, Uuid)> {
    let rest = key.strip_prefix(USER_NAMESPACE)?;
    let (user, sid) = rest.split_once(":session:")?;
    Some((Uuid::parse_str(user).ok()?, Uuid::parse_str(sid).ok()?))
}
