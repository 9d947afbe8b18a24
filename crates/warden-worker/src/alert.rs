//! Telegram alert delivery.
//!
//! [`TelegramAlertSink::send`] only enqueues. A single worker task drains the
//! queue and posts each message to the Bot API; delivery failures are logged
//! and dropped.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use warden_core::config::alert::AlertConfig;
use warden_core::error::AppError;
use warden_core::traits::alert::{AlertSink, NoopAlertSink};

/// Bot API `sendMessage` body.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Alert sink posting to a Telegram chat.
#[derive(Debug, Clone)]
pub struct TelegramAlertSink {
    sender: mpsc::Sender<String>,
}

impl TelegramAlertSink {
    /// Start the delivery worker. Must be called inside a Tokio runtime.
    ///
    /// The worker exits once every clone of the sink is dropped and the
    /// queue is drained.
    pub fn spawn(config: &AlertConfig) -> Result<(Self, JoinHandle<()>), AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let url = format!(
            "{}/bot{}/sendMessage",
            config.api_base.trim_end_matches('/'),
            config.bot_token
        );
        let handle = tokio::spawn(deliver(client, url, config.chat_id.clone(), receiver));

        tracing::info!(capacity = config.queue_capacity, "Telegram alert sink started");
        Ok((Self { sender }, handle))
    }
}

impl AlertSink for TelegramAlertSink {
    fn send(&self, message: String) {
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Alert queue full, dropping alert");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Alert worker stopped, dropping alert");
            }
        }
    }
}

async fn deliver(
    client: reqwest::Client,
    url: String,
    chat_id: String,
    mut receiver: mpsc::Receiver<String>,
) {
    while let Some(text) = receiver.recv().await {
        let body = SendMessage {
            chat_id: &chat_id,
            text: &text,
            parse_mode: "HTML",
        };
        match client.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(status = resp.status().as_u16(), "Telegram API rejected alert");
            }
            // The error may embed the URL, which carries the bot token.
            Err(e) => tracing::error!(error = %e.without_url(), "Telegram send failed"),
        }
    }
    tracing::info!("Alert worker stopped");
}

/// Build the configured sink: Telegram when credentials are present, otherwise no-op.
pub fn build_alert_sink(
    config: &AlertConfig,
) -> Result<(Arc<dyn AlertSink>, Option<JoinHandle<()>>), AppError> {
    if !config.is_enabled() {
        tracing::warn!("Telegram token or chat id is empty, alerts disabled");
        return Ok((Arc::new(NoopAlertSink), None));
    }
    let (sink, handle) = TelegramAlertSink::spawn(config)?;
    Ok((Arc::new(sink), Some(handle)))
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}
