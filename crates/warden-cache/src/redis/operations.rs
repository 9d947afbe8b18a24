//! Redis cache provider implementation.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use super::client::RedisClient;

/// Replace the value only if it still equals the expected one.
///
/// KEYS[1] = key, ARGV[1] = expected, ARGV[2] = new value, ARGV[3] = TTL in ms.
const COMPARE_AND_SWAP_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('SET', KEYS[1], ARGV[2], 'PX', ARGV[3])
    return 1
end
return 0
"#;

/// Redis-backed cache provider.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    /// Redis client.
    client: RedisClient,
    /// `COUNT` hint for `SCAN`.
    scan_count: usize,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider.
    pub fn new(client: RedisClient, scan_count: usize) -> Self {
        Self {
            client,
            scan_count: scan_count.max(1),
        }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

/// Cursor state of an in-progress `SCAN`.
struct ScanState {
    conn: ConnectionManager,
    cursor: u64,
    buffer: VecDeque<String>,
    done: bool,
}

/// `PX` argument. Redis rejects zero, so round up to one millisecond.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.keys().physical(key);
        let mut conn = self.client.connection();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        if ttl.is_zero() {
            return self.delete(key).await;
        }
        let full_key = self.client.keys().physical(key);
        let mut conn = self.client.connection();
        let _: () = redis::cmd("SET")
            .arg(&full_key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_persistent(&self, key: &str, value: &str) -> AppResult<()> {
        let full_key = self.client.keys().physical(key);
        let mut conn = self.client.connection();
        let _: () = conn.set(&full_key, value).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.keys().physical(key);
        let mut conn = self.client.connection();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.keys().physical(key);
        let mut conn = self.client.connection();
        let result: bool = conn.exists(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    fn scan_prefix(&self, prefix: &str) -> BoxStream<'static, AppResult<String>> {
        let keys = self.client.keys().clone();
        let pattern = keys.scan_pattern(prefix);
        let count = self.scan_count;
        let state = ScanState {
            conn: self.client.connection(),
            cursor: 0,
            buffer: VecDeque::new(),
            done: false,
        };

        stream::unfold(state, move |mut state| {
            let pattern = pattern.clone();
            let keys = keys.clone();
            async move {
                loop {
                    if let Some(key) = state.buffer.pop_front() {
                        let logical = keys.logical(&key).to_string();
                        return Some((Ok(logical), state));
                    }
                    if state.done {
                        return None;
                    }

                    let page: Result<(u64, Vec<String>), _> = redis::cmd("SCAN")
                        .arg(state.cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(count)
                        .query_async(&mut state.conn)
                        .await;

                    match page {
                        Ok((next, keys)) => {
                            debug!(cursor = next, batch = keys.len(), "SCAN page");
                            state.cursor = next;
                            state.done = next == 0;
                            state.buffer.extend(keys);
                        }
                        Err(e) => {
                            state.done = true;
                            return Some((Err(Self::map_err(e)), state));
                        }
                    }
                }
            }
        })
        .boxed()
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        new_value: &str,
        ttl: Duration,
    ) -> AppResult<bool> {
        let full_key = self.client.keys().physical(key);
        let mut conn = self.client.connection();
        let swapped: i64 = redis::Script::new(COMPARE_AND_SWAP_SCRIPT)
            .key(&full_key)
            .arg(expected)
            .arg(new_value)
            .arg(ttl_millis(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(swapped == 1)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.connection();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis_never_zero() {
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::from_secs(2)), 2_000);
    }
}
