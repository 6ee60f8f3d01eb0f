//! CloudVault server: hosts the drive and its scheduled lifecycle jobs.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use cloudvault_core::config::{AppConfig, LogFormat};
use cloudvault_core::error::AppError;
use cloudvault_database::DatabasePool;
use cloudvault_service::DriveService;
use cloudvault_storage::build_blob_store;
use cloudvault_worker::jobs::TrashSweepJobHandler;
use cloudvault_worker::{CronScheduler, JobExecutor};

#[tokio::main]
async fn main() {
    let config_path =
        std::env::var("CLOUDVAULT_CONFIG").unwrap_or_else(|_| "config/default".to_string());

    let config = match AppConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CloudVault v{}", env!("CARGO_PKG_VERSION"));

    let pool = DatabasePool::connect(&config.database).await?;
    pool.migrate().await?;

    tracing::info!(provider = %config.storage.provider, "Initializing blob store");
    let blobs = build_blob_store(&config.storage).await?;

    let drive = DriveService::new(pool.tree_store(), blobs, Arc::new(pool.users()), &config)?;
    tracing::info!(
        quota_bytes = config.quota.max_storage_bytes,
        retention_days = config.trash.retention_days,
        "Drive ready"
    );

    let mut scheduler = if config.worker.enabled {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(TrashSweepJobHandler::new(drive.sweeper().clone())));

        let scheduler = CronScheduler::new(Arc::new(executor)).await?;
        scheduler.register_default_tasks(&config.worker).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Scheduled jobs disabled");
        None
    };

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    pool.close().await;

    tracing::info!("CloudVault stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
