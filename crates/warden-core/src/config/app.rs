//! HTTP listener settings.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// HTTP listener and edge-policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request deadline in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Return internal error messages to clients. Development only.
    #[serde(default)]
    pub expose_error_details: bool,
    /// Sign-in and refresh requests allowed per client IP per minute.
    #[serde(default = "default_auth_rate")]
    pub auth_rate_per_minute: u32,
    /// Reverse proxies whose `X-Forwarded-For` header is believed.
    /// Requests from any other peer are keyed by the socket address.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
    /// Cross-origin policy.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            expose_error_details: false,
            auth_rate_per_minute: default_auth_rate(),
            trusted_proxies: Vec::new(),
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin policy for browser clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. `["*"]` allows any.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Preflight cache lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            max_age_seconds: default_max_age(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_auth_rate() -> u32 {
    30
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_age() -> u64 {
    3600
}
