//! Database migration management commands.

use clap::{Args, Subcommand};

use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_database::DatabasePool;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the database is reachable
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            pool.migrate().await?;
            output::print_success("Migrations complete.");
        }
        MigrateCommand::Check => {
            if pool.health_check().await? {
                output::print_success("Database reachable.");
            } else {
                output::print_warning("Database answered unexpectedly.");
            }
        }
    }

    pool.close().await;
    Ok(())
}
