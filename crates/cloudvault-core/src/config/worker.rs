//! Scheduled job configuration.

use serde::{Deserialize, Serialize};

/// Lifecycle scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether scheduled jobs run in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the expired-trash sweep.
    #[serde(default = "default_trash_sweep_schedule")]
    pub trash_sweep_schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trash_sweep_schedule: default_trash_sweep_schedule(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_trash_sweep_schedule() -> String {
    "0 0 0 * * *".to_string()
}
