//! Trash retention configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// How long trashed content survives before the sweep purges it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashConfig {
    /// Retention window in days.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

impl TrashConfig {
    /// The retention window as a duration.
    ///
    /// Fails for negative day counts and for counts too large to represent.
    pub fn retention(&self) -> AppResult<Duration> {
        if self.retention_days < 0 {
            return Err(AppError::configuration(format!(
                "trash.retention_days must not be negative, got {}",
                self.retention_days
            )));
        }
        Duration::try_days(self.retention_days).ok_or_else(|| {
            AppError::configuration(format!(
                "trash.retention_days is out of range: {}",
                self.retention_days
            ))
        })
    }
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
        }
    }
}

fn default_retention_days() -> i64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_retention() {
        let retention = TrashConfig::default().retention().unwrap();
        assert_eq!(retention, Duration::days(30));
    }

    #[test]
    fn test_retention_rejects_out_of_range() {
        for days in [i64::MAX, i64::MIN, -1] {
            let config = TrashConfig {
                retention_days: days,
            };
            let err = config.retention().unwrap_err();
            assert_eq!(err.kind, ErrorKind::Configuration);
        }
    }
}
