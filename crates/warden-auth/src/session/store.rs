//! Session records and block flags in the cache layer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tracing::{debug, warn};
use uuid::Uuid;

use warden_cache::keys;
use warden_cache::provider::CacheManager;
use warden_core::config::session::SessionConfig;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;
use warden_entity::session::SessionRecord;

use crate::error::{AuthError, AuthResult};

/// Outcome of an expired-record sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Session records inspected.
    pub scanned: usize,
    /// Records removed because their expiry had passed.
    pub removed: usize,
}

/// Typed access to session records and block flags.
///
/// Every cache round trip is bounded by the configured operation timeout.
/// Timeouts and cache failures surface as [`AuthError::Transient`], never as
/// "not found".
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Shared cache client.
    cache: Arc<CacheManager>,
    /// Upper bound for one cache call.
    op_timeout: Duration,
}

impl SessionStore {
    /// Creates a store from session configuration.
    pub fn new(cache: Arc<CacheManager>, config: &SessionConfig) -> Self {
        Self::with_timeout(cache, Duration::from_millis(config.operation_timeout_ms))
    }

    /// Creates a store with an explicit per-operation deadline.
    pub fn with_timeout(cache: Arc<CacheManager>, op_timeout: Duration) -> Self {
        Self { cache, op_timeout }
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AuthResult<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(op, error = %e, "Session store operation failed");
                Err(AuthError::Transient(format!("{op}: {}", e.message)))
            }
            Err(_) => {
                warn!(op, timeout_ms = self.op_timeout.as_millis() as u64, "Session store operation timed out");
                Err(AuthError::Transient(format!("{op}: timed out")))
            }
        }
    }

    fn parse(raw: &str) -> AuthResult<SessionRecord> {
        serde_json::from_str(raw)
            .map_err(|e| AuthError::Internal(format!("corrupt session record: {e}")))
    }

    fn encode(record: &SessionRecord) -> AuthResult<String> {
        serde_json::to_string(record)
            .map_err(|e| AuthError::Internal(format!("session record encoding failed: {e}")))
    }

    /// Upserts a record and resets its TTL.
    pub async fn put(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        record: &SessionRecord,
        ttl: Duration,
    ) -> AuthResult<()> {
        let value = Self::encode(record)?;
        let key = keys::session(user_id, session_id);
        self.bounded("put", self.cache.set(&key, &value, ttl)).await
    }

    /// Reads a record.
    pub async fn get(&self, user_id: Uuid, session_id: Uuid) -> AuthResult<Option<SessionRecord>> {
        Ok(self
            .get_raw(user_id, session_id)
            .await?
            .map(|(_, record)| record))
    }

    /// Reads a record together with the exact stored bytes, for a later
    /// [`SessionStore::compare_and_swap`].
    pub async fn get_raw(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> AuthResult<Option<(String, SessionRecord)>> {
        let key = keys::session(user_id, session_id);
        match self.bounded("get", self.cache.get(&key)).await? {
            Some(raw) => {
                let record = Self::parse(&raw)?;
                Ok(Some((raw, record)))
            }
            None => Ok(None),
        }
    }

    /// Whether a record is present.
    pub async fn exists(&self, user_id: Uuid, session_id: Uuid) -> AuthResult<bool> {
        let key = keys::session(user_id, session_id);
        self.bounded("exists", self.cache.exists(&key)).await
    }

    /// Deletes a record. Absent records are not an error.
    pub async fn delete(&self, user_id: Uuid, session_id: Uuid) -> AuthResult<()> {
        let key = keys::session(user_id, session_id);
        self.bounded("delete", self.cache.delete(&key)).await
    }

    /// Replaces the record only if its stored bytes still equal `expected_raw`.
    pub async fn compare_and_swap(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        expected_raw: &str,
        record: &SessionRecord,
        ttl: Duration,
    ) -> AuthResult<bool> {
        let value = Self::encode(record)?;
        let key = keys::session(user_id, session_id);
        self.bounded(
            "compare_and_swap",
            self.cache.compare_and_swap(&key, expected_raw, &value, ttl),
        )
        .await
    }

    /// Key scan where each page fetch is bounded by the operation timeout.
    /// The stream ends after the first error.
    fn scan(&self, prefix: &str) -> BoxStream<'static, AuthResult<String>> {
        let deadline = self.op_timeout;
        let inner = self.cache.scan_prefix(prefix);
        stream::unfold(Some(inner), move |state| async move {
            let mut inner = state?;
            match tokio::time::timeout(deadline, inner.next()).await {
                Ok(Some(Ok(key))) => Some((Ok(key), Some(inner))),
                Ok(Some(Err(e))) => Some((Err(AuthError::Transient(format!("scan: {}", e.message))), None)),
                Ok(None) => None,
                Err(_) => Some((Err(AuthError::Transient("scan: timed out".into())), None)),
            }
        })
        .boxed()
    }

    /// Lazily enumerates the ids of a user's sessions.
    pub fn session_ids(&self, user_id: Uuid) -> BoxStream<'static, AuthResult<Uuid>> {
        self.scan(&keys::user_sessions_prefix(user_id))
            .filter_map(|key| async move {
                match key {
                    Ok(key) => keys::parse_session(&key).map(|(_, sid)| Ok(sid)),
                    Err(e) => Some(Err(e)),
                }
            })
            .boxed()
    }

    /// Lazily enumerates a user's sessions.
    ///
    /// Best effort: records deleted between the scan and the read are
    /// skipped, and records created during the scan may be missed.
    pub fn list_by_user(&self, user_id: Uuid) -> BoxStream<'static, AuthResult<(Uuid, SessionRecord)>> {
        let store = self.clone();
        self.session_ids(user_id)
            .filter_map(move |sid| {
                let store = store.clone();
                async move {
                    let sid = match sid {
                        Ok(sid) => sid,
                        Err(e) => return Some(Err(e)),
                    };
                    match store.get(user_id, sid).await {
                        Ok(Some(record)) => Some(Ok((sid, record))),
                        Ok(None) => None,
                        Err(e) => Some(Err(e)),
                    }
                }
            })
            .boxed()
    }

    /// Marks a user as blocked. `None` blocks until cleared.
    ///
    /// A zero TTL is rejected: the cache treats it as a delete, which would
    /// lift an existing block.
    pub async fn set_block_flag(&self, user_id: Uuid, ttl: Option<Duration>) -> AuthResult<()> {
        let key = keys::blocked(user_id);
        match ttl {
            Some(ttl) if ttl.is_zero() => Err(AuthError::InvalidInput(
                "block duration must be positive".into(),
            )),
            Some(ttl) => {
                self.bounded("block", self.cache.set(&key, keys::BLOCK_FLAG_VALUE, ttl))
                    .await
            }
            None => {
                self.bounded(
                    "block",
                    self.cache.set_persistent(&key, keys::BLOCK_FLAG_VALUE),
                )
                .await
            }
        }
    }

    /// Removes a user's block flag.
    pub async fn clear_block_flag(&self, user_id: Uuid) -> AuthResult<()> {
        let key = keys::blocked(user_id);
        self.bounded("unblock", self.cache.delete(&key)).await
    }

    /// Whether a user carries a block flag.
    pub async fn is_blocked(&self, user_id: Uuid) -> AuthResult<bool> {
        let key = keys::blocked(user_id);
        self.bounded("is_blocked", self.cache.exists(&key)).await
    }

    /// Deletes every session record whose own expiry has passed.
    ///
    /// Records normally vanish with their TTL; this catches records whose
    /// TTL was lost (restored snapshots, manual writes).
    pub async fn sweep_expired(&self) -> AuthResult<SweepReport> {
        let now = Utc::now();
        let mut report = SweepReport::default();
        let mut keys_stream = self.scan(keys::USER_NAMESPACE);

        while let Some(key) = keys_stream.next().await {
            let key = key?;
            let Some((user_id, session_id)) = keys::parse_session(&key) else {
                continue;
            };
            report.scanned += 1;

            let expired = match self.get(user_id, session_id).await {
                Ok(Some(record)) => record.is_expired_at(now),
                Ok(None) => false,
                Err(AuthError::Internal(reason)) => {
                    warn!(%user_id, %session_id, %reason, "Removing unreadable session record");
                    true
                }
                Err(e) => return Err(e),
            };

            if expired {
                self.delete(user_id, session_id).await?;
                report.removed += 1;
            }
        }

        debug!(scanned = report.scanned, removed = report.removed, "Session sweep finished");
        Ok(report)
    }
}
