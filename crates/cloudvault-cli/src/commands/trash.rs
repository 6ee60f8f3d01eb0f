//! Trash lifecycle commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;

use super::Session;
use crate::output::{self, OutputFormat};

/// Arguments for trash commands
#[derive(Debug, Args)]
pub struct TrashArgs {
    /// Trash subcommand
    #[command(subcommand)]
    pub command: TrashCommand,
}

/// Trash subcommands
#[derive(Debug, Subcommand)]
pub enum TrashCommand {
    /// Purge trash older than the retention window, for every owner
    Sweep {
        /// Sweep as of this RFC 3339 instant instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// List a user's trash
    List {
        /// Owner email
        #[arg(short, long)]
        email: String,
    },
    /// Permanently delete everything in a user's trash
    Empty {
        /// Owner email
        #[arg(short, long)]
        email: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct TrashRow {
    kind: String,
    id: String,
    name: String,
    trashed_at: String,
}

/// Execute trash commands
pub async fn execute(
    args: &TrashArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = Session::open(config).await?;

    match &args.command {
        TrashCommand::Sweep { now } => {
            let report = session
                .drive
                .sweep_expired_trash(now.unwrap_or_else(Utc::now))
                .await?;

            output::print_item(&report, format);
            if report.failed > 0 {
                output::print_warning(&format!(
                    "{} candidate(s) could not be purged; they will be retried on the next sweep",
                    report.failed
                ));
            }
        }
        TrashCommand::List { email } => {
            let ctx = session.act_as(email).await?;
            let listing = session.drive.list_trash(&ctx).await?;

            let mut rows: Vec<TrashRow> = listing
                .folders
                .iter()
                .map(|f| TrashRow {
                    kind: "folder".to_string(),
                    id: f.id.to_string(),
                    name: f.name.clone(),
                    trashed_at: format_time(f.trashed_at),
                })
                .collect();
            rows.extend(listing.files.iter().map(|f| TrashRow {
                kind: "file".to_string(),
                id: f.id.to_string(),
                name: f.name.clone(),
                trashed_at: format_time(f.trashed_at),
            }));

            output::print_list(&rows, format);
        }
        TrashCommand::Empty { email, force } => {
            let ctx = session.act_as(email).await?;

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Permanently delete everything in {email}'s trash?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    session.close().await;
                    return Ok(());
                }
            }

            let report = session.drive.empty_trash(&ctx).await?;
            output::print_success(&format!(
                "Trash emptied: {} node(s) deleted, {} live node(s) moved to root",
                report.applied, report.detached
            ));
        }
    }

    session.close().await;
    Ok(())
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
