//! CLI command definitions and dispatch.

pub mod migrate;
pub mod storage;
pub mod trash;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_database::{DatabasePool, UserDirectory};
use cloudvault_service::{DriveService, RequestContext};
use cloudvault_storage::build_blob_store;

use crate::output::OutputFormat;

/// CloudVault administration
#[derive(Debug, Parser)]
#[command(name = "cloudvault", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Trash lifecycle
    Trash(trash::TrashArgs),
    /// Quota and usage reports
    Storage(storage::StorageArgs),
    /// Account management
    User(user::UserArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config)?;

        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Trash(args) => trash::execute(args, &config, self.format).await,
            Commands::Storage(args) => storage::execute(args, &config, self.format).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
        }
    }
}

/// A connected drive plus the pool it runs on.
pub struct Session {
    pub pool: DatabasePool,
    pub drive: DriveService,
}

impl Session {
    /// Connect to the database and blob store named in `config`.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let pool = DatabasePool::connect(&config.database).await?;
        let blobs = build_blob_store(&config.storage).await?;
        let drive = DriveService::new(pool.tree_store(), blobs, Arc::new(pool.users()), config)?;
        Ok(Self { pool, drive })
    }

    /// Act as the account registered under `email`.
    pub async fn act_as(&self, email: &str) -> Result<RequestContext, AppError> {
        let account = self
            .pool
            .users()
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))?;
        Ok(RequestContext::for_account(&account))
    }

    /// Release the connection pool.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_trash_empty() {
        let cli = Cli::try_parse_from([
            "cloudvault",
            "--format",
            "json",
            "trash",
            "empty",
            "--email",
            "owner@example.com",
            "--force",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, "config/default");
        match cli.command {
            Commands::Trash(trash::TrashArgs {
                command: trash::TrashCommand::Empty { email, force },
            }) => {
                assert_eq!(email, "owner@example.com");
                assert!(force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_sweep_accepts_rfc3339_time() {
        let cli = Cli::try_parse_from([
            "cloudvault",
            "trash",
            "sweep",
            "--now",
            "2026-01-31T00:00:00Z",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Trash(trash::TrashArgs {
                command: trash::TrashCommand::Sweep { now: Some(_) }
            })
        ));
    }

    #[test]
    fn test_rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "cloudvault",
            "user",
            "add",
            "a@example.com",
            "--name",
            "A",
            "--role",
            "root",
        ]);
        assert!(result.is_err());
    }
}
