//! Storage quota value object.

use serde::{Deserialize, Serialize};

/// An owner's live usage measured against the cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageQuota {
    /// The cap in bytes.
    pub total_bytes: i64,
    /// Bytes held by non-trashed files.
    pub used_bytes: i64,
    /// Remaining headroom, never negative.
    pub available_bytes: i64,
    /// Usage percentage (0.0 - 100.0).
    pub usage_percent: f64,
}

impl StorageQuota {
    /// Create a quota from total and used values.
    pub fn new(total_bytes: i64, used_bytes: i64) -> Self {
        let usage_percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        };

        Self {
            total_bytes,
            used_bytes,
            available_bytes: (total_bytes - used_bytes).max(0),
            usage_percent,
        }
    }

    /// Check if the quota is already exhausted.
    pub fn is_exceeded(&self) -> bool {
        self.used_bytes >= self.total_bytes
    }

    /// Check if adding the given number of bytes would exceed the quota.
    pub fn would_exceed(&self, additional_bytes: i64) -> bool {
        self.used_bytes.saturating_add(additional_bytes) > self.total_bytes
    }
}
