//! Redis connection and physical key layout.

use redis::Client;
use redis::aio::ConnectionManager;

use warden_core::config::cache::RedisCacheConfig;
use warden_core::config::redact_url;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;

/// Maps logical session-store keys to physical Redis keys.
///
/// With an empty namespace the two are identical, so existing
/// `{tenant}:session:{user}:{device}` keys stay readable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl KeySpace {
    /// Key space under `namespace`, e.g. `"warden:"`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Physical key for a logical one.
    pub fn physical(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }

    /// Logical key for a physical one returned by `SCAN`.
    pub fn logical<'a>(&self, physical: &'a str) -> &'a str {
        physical
            .strip_prefix(self.namespace.as_str())
            .unwrap_or(physical)
    }

    /// `SCAN MATCH` pattern for every key under a logical prefix.
    pub fn scan_pattern(&self, prefix: &str) -> String {
        let literal = self.physical(prefix);
        let mut pattern = String::with_capacity(literal.len() + 1);
        for c in literal.chars() {
            if matches!(c, '*' | '?' | '[' | ']' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('*');
        pattern
    }
}

/// Reconnecting multiplexed connection plus its key space.
#[derive(Debug, Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    keys: KeySpace,
}

impl RedisClient {
    /// Connect and wait for the first successful handshake.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        let target = redact_url(&config.url);
        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid Redis URL {target}"),
                e,
            )
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, format!("Cannot reach Redis at {target}"), e)
        })?;

        tracing::info!(url = %target, namespace = %config.key_prefix, "Redis connected");
        Ok(Self {
            conn,
            keys: KeySpace::new(config.key_prefix.clone()),
        })
    }

    /// Handle for one command. Clones share the underlying socket.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Key layout applied to every command.
    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_namespace_keeps_keys() {
        let keys = KeySpace::default();
        assert_eq!(keys.physical("t:session:u:d"), "t:session:u:d");
        assert_eq!(keys.logical("t:session:u:d"), "t:session:u:d");
    }

    #[test]
    fn test_namespace_round_trips_through_scan() {
        let keys = KeySpace::new("warden:");
        assert_eq!(keys.physical("blocked:u"), "warden:blocked:u");
        assert_eq!(keys.logical("warden:blocked:u"), "blocked:u");
        assert_eq!(keys.logical("other:blocked:u"), "other:blocked:u");
    }

    #[test]
    fn test_scan_pattern_escapes_glob() {
        let keys = KeySpace::new("app[1]:");
        assert_eq!(keys.scan_pattern("a*b?"), "app\\[1\\]:a\\*b\\?*");
        assert_eq!(KeySpace::default().scan_pattern("x\\"), "x\\\\*");
    }
}
