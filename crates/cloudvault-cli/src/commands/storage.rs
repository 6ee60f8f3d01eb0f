//! Quota and usage report commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_entity::storage::FileCategory;

use super::Session;
use crate::output::{self, OutputFormat, format_bytes};

/// Arguments for storage commands
#[derive(Debug, Args)]
pub struct StorageArgs {
    /// Storage subcommand
    #[command(subcommand)]
    pub command: StorageCommand,
}

/// Storage subcommands
#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// Show a user's quota usage
    Usage {
        /// Owner email
        #[arg(short, long)]
        email: String,
    },
    /// Break a user's usage down by file category
    Stats {
        /// Owner email
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    category: String,
    active_files: u64,
    active: String,
    trash_files: u64,
    trash: String,
}

/// Execute storage commands
pub async fn execute(
    args: &StorageArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = Session::open(config).await?;

    match &args.command {
        StorageCommand::Usage { email } => {
            let ctx = session.act_as(email).await?;
            let quota = session.drive.usage(&ctx).await?;

            match format {
                OutputFormat::Json => output::print_item(&quota, format),
                OutputFormat::Table => {
                    println!("Storage usage for {email}");
                    output::print_kv("Used", &format_bytes(quota.used_bytes));
                    output::print_kv("Available", &format_bytes(quota.available_bytes));
                    output::print_kv("Cap", &format_bytes(quota.total_bytes));
                    output::print_kv("Usage", &format!("{:.1}%", quota.usage_percent));
                }
            }
        }
        StorageCommand::Stats { email } => {
            let ctx = session.act_as(email).await?;
            let stats = session.drive.storage_stats(&ctx).await?;

            match format {
                OutputFormat::Json => output::print_item(&stats, format),
                OutputFormat::Table => {
                    let rows: Vec<CategoryRow> = FileCategory::ALL
                        .iter()
                        .map(|&category| {
                            let active = stats.active.category(category);
                            let trash = stats.trash.category(category);
                            CategoryRow {
                                category: category.as_str().to_string(),
                                active_files: active.files,
                                active: format_bytes(active.bytes),
                                trash_files: trash.files,
                                trash: format_bytes(trash.bytes),
                            }
                        })
                        .collect();

                    output::print_list(&rows, format);
                    output::print_kv("Active folders", &stats.active.folders.to_string());
                    output::print_kv("Trashed folders", &stats.trash.folders.to_string());
                    output::print_kv("Total", &format_bytes(stats.total_bytes()));
                }
            }
        }
    }

    session.close().await;
    Ok(())
}
