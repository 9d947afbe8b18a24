//! Session lifecycle manager: sign-in, validation, rotation, and revocation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use warden_core::config::auth::AuthConfig;
use warden_core::traits::alert::AlertSink;
use warden_entity::session::SessionRecord;
use warden_entity::user::{User, UserRole};

use super::store::SessionStore;
use super::token::{constant_time_eq, generate_refresh_token, generate_session_id};
use crate::directory::UserDirectory;
use crate::error::{AuthError, AuthResult};
use crate::jwt::{Claims, TokenCodec};
use crate::password::PasswordHasher;

/// Access + refresh pair handed to the client.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Session the pair belongs to.
    pub session_id: Uuid,
    /// Short-lived signed access token.
    pub access_token: String,
    /// Opaque single-use refresh token.
    pub refresh_token: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token (and session) expiry.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Public view of the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// User id.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Current role.
    pub role: UserRole,
    /// Tenant, if any.
    pub tenant_id: Option<Uuid>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            tenant_id: user.tenant_id,
        }
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct SignInResult {
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The authenticated user.
    pub user: UserSummary,
}

/// Outcome of revoking every session of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogoutAllReport {
    /// Sessions deleted.
    pub revoked: usize,
    /// Sessions whose deletion still failed after one retry.
    pub failed: usize,
}

/// One entry of the "active sessions" listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Session id.
    pub session_id: Uuid,
    /// User-Agent bound at login.
    pub user_agent: String,
    /// Client IP observed at login.
    pub client_ip: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the current refresh token expires.
    pub expires_at: DateTime<Utc>,
    /// Whether this is the caller's own session.
    pub is_current: bool,
}

/// Manages the complete session lifecycle.
///
/// Owns no mutable state of its own: the session store is the single point
/// of serialization, and rotation is committed with compare-and-swap.
#[derive(Clone)]
pub struct SessionManager {
    /// Token signing and verification.
    codec: Arc<TokenCodec>,
    /// Session persistence.
    store: Arc<SessionStore>,
    /// User lookup.
    users: Arc<dyn UserDirectory>,
    /// Password verification.
    password_hasher: Arc<PasswordHasher>,
    /// Best-effort security alerts.
    alerts: Arc<dyn AlertSink>,
    /// Access token lifetime.
    access_ttl: Duration,
    /// Refresh token and session lifetime.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<SessionStore>,
        users: Arc<dyn UserDirectory>,
        password_hasher: Arc<PasswordHasher>,
        alerts: Arc<dyn AlertSink>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            codec,
            store,
            users,
            password_hasher,
            alerts,
            access_ttl: Duration::from_secs(config.access_ttl_minutes * 60),
            refresh_ttl: Duration::from_secs(config.refresh_ttl_hours * 3600),
        }
    }

    /// Overrides token lifetimes.
    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// The session store backing this manager.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn refresh_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + chrono::Duration::from_std(self.refresh_ttl).unwrap_or(chrono::Duration::zero())
    }

    /// Verifies credentials and opens a session.
    ///
    /// Unknown user and wrong password are indistinguishable. Blocked or
    /// inactive accounts are reported only after the password verified.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
        user_agent: &str,
        client_ip: &str,
    ) -> AuthResult<SignInResult> {
        let Some(user) = self.users.get_by_username(username).await? else {
            self.password_hasher.verify_against_dummy(password);
            info!(username, "Sign-in rejected: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        let valid = self
            .password_hasher
            .verify_password(password, &user.password_hash)
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                AuthError::Internal("password verification failed".into())
            })?;
        if !valid {
            info!(user_id = %user.id, "Sign-in rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_login() || self.store.is_blocked(user.id).await? {
            warn!(user_id = %user.id, "Sign-in rejected: account blocked");
            return Err(AuthError::AccountBlocked);
        }

        let tokens = self.login(&user, user_agent, client_ip).await?;
        Ok(SignInResult {
            tokens,
            user: UserSummary::from(&user),
        })
    }

    /// Opens a new session for an already-authenticated user.
    pub async fn login(
        &self,
        user: &User,
        user_agent: &str,
        client_ip: &str,
    ) -> AuthResult<TokenPair> {
        let session_id = generate_session_id();
        let refresh_token = generate_refresh_token();
        let now = Utc::now();

        let access = self.codec.issue(
            user.id,
            session_id,
            user.tenant_id,
            user.role,
            self.access_ttl,
        )?;

        let record = SessionRecord {
            refresh_token: refresh_token.clone(),
            user_agent: user_agent.to_string(),
            client_ip: client_ip.to_string(),
            created_at: now,
            expires_at: self.refresh_expiry(now),
        };
        self.store
            .put(user.id, session_id, &record, self.refresh_ttl)
            .await?;

        info!(user_id = %user.id, session_id = %session_id, client_ip, "Session created");
        Ok(TokenPair {
            session_id,
            access_token: access.token,
            refresh_token,
            access_expires_at: access.expires_at,
            refresh_expires_at: record.expires_at,
        })
    }

    /// The contract every protected request must satisfy: valid signature
    /// and expiry, no block flag, and a live session.
    pub async fn validate_access(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.codec.verify(token)?;

        if self.store.is_blocked(claims.sub).await? {
            return Err(AuthError::AccountBlocked);
        }
        if !self.store.exists(claims.sub, claims.sid).await? {
            return Err(AuthError::SessionRevoked);
        }
        Ok(claims)
    }

    /// Rotates a session to a new access + refresh pair.
    ///
    /// A refresh token is single-use. Presenting anything other than the
    /// current value deletes the session. Of two concurrent refreshes with
    /// the same token at most one succeeds; the other fails with
    /// [`AuthError::SessionMismatch`] and the session is deleted. A changed
    /// User-Agent fails with [`AuthError::SessionRevoked`] but leaves the
    /// session in place.
    pub async fn refresh(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        presented_refresh_token: &str,
        user_agent: &str,
    ) -> AuthResult<TokenPair> {
        let Some((raw, record)) = self.store.get_raw(user_id, session_id).await? else {
            return Err(AuthError::SessionRevoked);
        };

        if !constant_time_eq(&record.refresh_token, presented_refresh_token) {
            return Err(self.revoke_on_mismatch(user_id, session_id, "stale refresh token").await);
        }

        if record.user_agent != user_agent {
            warn!(
                user_id = %user_id,
                session_id = %session_id,
                "Refresh rejected: user agent changed"
            );
            return Err(AuthError::SessionRevoked);
        }

        let Some(user) = self.users.get_by_id(user_id).await? else {
            warn!(user_id = %user_id, "Refresh rejected: user no longer exists");
            return Err(AuthError::SessionRevoked);
        };
        if !user.can_login() || self.store.is_blocked(user_id).await? {
            return Err(AuthError::AccountBlocked);
        }

        let now = Utc::now();
        let rotated = SessionRecord {
            refresh_token: generate_refresh_token(),
            expires_at: self.refresh_expiry(now),
            ..record
        };
        let access = self.codec.issue(
            user.id,
            session_id,
            user.tenant_id,
            user.role,
            self.access_ttl,
        )?;

        let swapped = self
            .store
            .compare_and_swap(user_id, session_id, &raw, &rotated, self.refresh_ttl)
            .await?;
        if !swapped {
            return Err(self.revoke_on_mismatch(user_id, session_id, "concurrent refresh").await);
        }

        info!(user_id = %user_id, session_id = %session_id, "Session refreshed");
        Ok(TokenPair {
            session_id,
            access_token: access.token,
            refresh_token: rotated.refresh_token,
            access_expires_at: access.expires_at,
            refresh_expires_at: rotated.expires_at,
        })
    }

    /// Deletes the session after a refresh-token mismatch and raises an
    /// alert. Returns the error to hand back to the caller.
    async fn revoke_on_mismatch(&self, user_id: Uuid, session_id: Uuid, reason: &str) -> AuthError {
        warn!(user_id = %user_id, session_id = %session_id, reason, "Refresh token mismatch; revoking session");
        if let Err(e) = self.store.delete(user_id, session_id).await {
            error!(user_id = %user_id, session_id = %session_id, error = %e, "Failed to revoke session after mismatch");
        }
        self.alerts.send(format!(
            "Session revoked after refresh token mismatch ({reason})\nuser: {user_id}\nsession: {session_id}"
        ));
        AuthError::SessionMismatch
    }

    /// Refresh driven by an unverified bearer token and the refresh token.
    pub async fn refresh_session(
        &self,
        presented_refresh_token: &str,
        bearer_unverified: &str,
        user_agent: &str,
    ) -> AuthResult<TokenPair> {
        let claims = self.codec.decode_unverified(bearer_unverified)?;
        self.refresh(claims.sub, claims.sid, presented_refresh_token, user_agent)
            .await
    }

    /// Deletes one session. Idempotent.
    pub async fn logout(&self, user_id: Uuid, session_id: Uuid) -> AuthResult<()> {
        self.store.delete(user_id, session_id).await?;
        info!(user_id = %user_id, session_id = %session_id, "Session closed");
        Ok(())
    }

    /// Best-effort logout from an unverified bearer token. Never fails.
    pub async fn logout_bearer(&self, bearer_unverified: &str) {
        match self.codec.decode_unverified(bearer_unverified) {
            Ok(claims) => {
                if let Err(e) = self.logout(claims.sub, claims.sid).await {
                    warn!(user_id = %claims.sub, error = %e, "Logout could not delete session");
                }
            }
            Err(_) => {
                tracing::debug!("Logout with unreadable bearer token ignored");
            }
        }
    }

    /// Deletes every session of a user.
    ///
    /// Individual deletion failures do not stop the sweep and are retried
    /// once at the end. A failure to enumerate sessions is returned as
    /// [`AuthError::Transient`].
    pub async fn logout_all(&self, user_id: Uuid) -> AuthResult<LogoutAllReport> {
        let mut report = LogoutAllReport::default();
        let mut retry = Vec::new();
        let mut ids = self.store.session_ids(user_id);

        while let Some(next) = ids.next().await {
            let session_id = match next {
                Ok(id) => id,
                Err(e) => {
                    error!(user_id = %user_id, revoked = report.revoked, error = %e, "Session enumeration failed");
                    return Err(AuthError::Transient(format!(
                        "session enumeration failed after revoking {}: {e}",
                        report.revoked
                    )));
                }
            };
            match self.store.delete(user_id, session_id).await {
                Ok(()) => report.revoked += 1,
                Err(e) => {
                    warn!(user_id = %user_id, session_id = %session_id, error = %e, "Session deletion failed; will retry");
                    retry.push(session_id);
                }
            }
        }

        for session_id in retry {
            match self.store.delete(user_id, session_id).await {
                Ok(()) => report.revoked += 1,
                Err(e) => {
                    error!(user_id = %user_id, session_id = %session_id, error = %e, "Session deletion failed after retry");
                    report.failed += 1;
                }
            }
        }

        info!(user_id = %user_id, revoked = report.revoked, failed = report.failed, "All sessions closed");
        Ok(report)
    }

    /// Informational listing of a user's sessions.
    pub async fn list_sessions(
        &self,
        user_id: Uuid,
        current_session: Option<Uuid>,
    ) -> AuthResult<Vec<SessionView>> {
        let mut sessions: Vec<SessionView> = self
            .store
            .list_by_user(user_id)
            .map_ok(|(session_id, record)| SessionView {
                session_id,
                user_agent: record.user_agent,
                client_ip: record.client_ip,
                created_at: record.created_at,
                expires_at: record.expires_at,
                is_current: Some(session_id) == current_session,
            })
            .try_collect()
            .await?;
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    /// Blocks a user. Existing access tokens stop validating immediately.
    pub async fn block_user(&self, user_id: Uuid, ttl: Option<Duration>) -> AuthResult<()> {
        self.store.set_block_flag(user_id, ttl).await?;
        warn!(user_id = %user_id, ttl_secs = ttl.map(|t| t.as_secs()), "User blocked");
        Ok(())
    }

    /// Clears a user's block flag.
    pub async fn unblock_user(&self, user_id: Uuid) -> AuthResult<()> {
        self.store.clear_block_flag(user_id).await?;
        info!(user_id = %user_id, "User unblocked");
        Ok(())
    }
}
