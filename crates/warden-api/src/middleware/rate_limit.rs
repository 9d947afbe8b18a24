//! Token bucket rate limiter middleware.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;

use warden_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::ClientInfo;
use crate::state::AppState;

/// Buckets kept before idle, full ones are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Simple in-memory token bucket rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Key to bucket state.
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
    /// Maximum tokens per bucket.
    max_tokens: u32,
    /// Token refill rate per second.
    refill_rate: f64,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(max_tokens: u32, refill_rate: f64) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            max_tokens: max_tokens.max(1),
            refill_rate,
        }
    }

    /// Allows `per_minute` requests per key, with bursts up to the same amount.
    pub fn per_minute(per_minute: u32) -> Self {
        Self::new(per_minute, f64::from(per_minute) / 60.0)
    }

    /// Attempts to consume a token for the given key.
    pub async fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        if buckets.len() >= PRUNE_THRESHOLD {
            let (max, rate) = (f64::from(self.max_tokens), self.refill_rate);
            buckets.retain(|_, b| {
                b.tokens + now.duration_since(b.last_refill).as_secs_f64() * rate < max
            });
        }

        let bucket = buckets.entry(key.to_string()).or_insert(TokenBucket {
            tokens: f64::from(self.max_tokens),
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(f64::from(self.max_tokens));
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Limits sign-in and refresh attempts per client IP.
pub async fn limit_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let client = ClientInfo::resolve(&parts, &state.config.server.trusted_proxies);

    if !state.auth_limiter.check(&client.ip).await {
        tracing::warn!(client_ip = %client.ip, path = %parts.uri.path(), "Rate limit exceeded");
        return Err(AppError::rate_limit("Rate limit exceeded").into());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bucket_exhausts_per_key() {
        let limiter = RateLimiter::new(2, 0.0);
        assert!(limiter.check("a").await);
        assert!(limiter.check("a").await);
        assert!(!limiter.check("a").await);
        assert!(limiter.check("b").await);
    }

    #[tokio::test]
    async fn test_bucket_refills() {
        let limiter = RateLimiter::new(1, 1_000.0);
        assert!(limiter.check("a").await);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(limiter.check("a").await);
    }
}
