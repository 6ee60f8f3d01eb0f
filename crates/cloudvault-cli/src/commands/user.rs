//! Account management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_database::DatabasePool;
use cloudvault_entity::user::UserRole;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register an account
    Add {
        /// Email address
        email: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// System role: user or admin
        #[arg(short, long, default_value = "user")]
        role: UserRole,
    },
    /// List all accounts
    List,
}

#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    role: String,
    active: bool,
    created_at: String,
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    let users = pool.users();

    match &args.command {
        UserCommand::Add { email, name, role } => {
            let account = users.create(email, name, *role).await?;
            output::print_success(&format!("User '{}' created ({})", account.email, account.id));
        }
        UserCommand::List => {
            let rows: Vec<UserRow> = users
                .find_all()
                .await?
                .iter()
                .map(|u| UserRow {
                    id: u.id.to_string(),
                    email: u.email.clone(),
                    name: u.name.clone(),
                    role: u.role.to_string(),
                    active: u.is_active,
                    created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            output::print_list(&rows, format);
        }
    }

    pool.close().await;
    Ok(())
}
