//! Storage quota configuration.

use serde::{Deserialize, Serialize};

/// Per-owner storage cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum bytes of non-trashed content an owner may hold.
    #[serde(default = "default_max_storage")]
    pub max_storage_bytes: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_storage_bytes: default_max_storage(),
        }
    }
}

fn default_max_storage() -> i64 {
    5_368_709_120 // 5 GiB
}
