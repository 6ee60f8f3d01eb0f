//! Application configuration schemas.
//!
//! Deserialized from TOML via the `config` crate and overlaid with
//! `CLOUDVAULT__*` environment variables. Each sub-module is one section.

pub mod database;
pub mod logging;
pub mod quota;
pub mod storage;
pub mod trash;
pub mod worker;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::quota::QuotaConfig;
pub use self::storage::StorageConfig;
pub use self::trash::TrashConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Per-owner storage quota.
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Trash retention.
    #[serde(default)]
    pub trash: TrashConfig,
    /// Scheduled lifecycle jobs.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the TOML file at `path`.
    ///
    /// A sibling overlay named after `CLOUDVAULT_ENV` (e.g.
    /// `config/production.toml`) is merged when present, followed by
    /// environment variables such as `CLOUDVAULT__QUOTA__MAX_STORAGE_BYTES`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Ok(env) = std::env::var("CLOUDVAULT_ENV") {
            let dir = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
            let overlay = dir.join(&env);
            builder = builder.add_source(
                config::File::with_name(&overlay.to_string_lossy()).required(false),
            );
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("CLOUDVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that deserialize but cannot be used.
    pub fn validate(&self) -> Result<(), AppError> {
        self.trash.retention()?;
        Ok(())
    }
}
