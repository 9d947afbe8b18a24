//! Housekeeping scheduler configuration.

use serde::{Deserialize, Serialize};

/// Background housekeeping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression for the expired-session sweep.
    #[serde(default = "default_sweep_cron")]
    pub session_sweep_cron: String,
    /// Cron expression for the cache health probe.
    #[serde(default = "default_probe_cron")]
    pub cache_probe_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_sweep_cron: default_sweep_cron(),
            cache_probe_cron: default_probe_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_cron() -> String {
    "0 */15 * * * *".to_string()
}

fn default_probe_cron() -> String {
    "0 * * * * *".to_string()
}
