//! Background work for Warden.
//!
//! This crate provides:
//! - A Telegram alert sink with a bounded, drop-on-full queue
//! - A cron scheduler for housekeeping outside the request path
//! - The housekeeping jobs: expired-session sweep and cache health probe

pub mod alert;
pub mod jobs;
pub mod scheduler;

pub use alert::{TelegramAlertSink, build_alert_sink, escape_html};
pub use scheduler::CronScheduler;
