//! Operational alert configuration.

use serde::{Deserialize, Serialize};

/// Telegram alert delivery settings.
///
/// Alerts are disabled when either `bot_token` or `chat_id` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Telegram bot token.
    #[serde(default)]
    pub bot_token: String,
    /// Destination chat id.
    #[serde(default)]
    pub chat_id: String,
    /// Bot API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Capacity of the in-process alert queue. Alerts beyond it are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// HTTP timeout for a single delivery, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl AlertConfig {
    /// Whether delivery is configured.
    pub fn is_enabled(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_api_base(),
            queue_capacity: default_queue_capacity(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_queue_capacity() -> usize {
    100
}

fn default_timeout() -> u64 {
    10
}
