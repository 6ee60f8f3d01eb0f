//! Cron scheduler for periodic lifecycle tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info, warn};

use cloudvault_core::config::WorkerConfig;
use cloudvault_core::error::AppError;

use crate::executor::{JobExecutionError, JobExecutor, JobRequest};
use crate::jobs::trash_sweep::TRASH_SWEEP_JOB;

/// Fires registered jobs through a [`JobExecutor`] on cron schedules.
pub struct CronScheduler {
    scheduler: JobScheduler,
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("job_types", &self.executor.registered_types())
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the scheduled lifecycle tasks named in `config`.
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register(TRASH_SWEEP_JOB, &config.trash_sweep_schedule)
            .await?;

        info!("All scheduled tasks registered");
        Ok(())
    }

    /// Run `job_type` on the six-field cron `schedule`.
    pub async fn register(&self, job_type: &str, schedule: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled job '{job_type}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let name = job_type.to_string();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let name = name.clone();
            Box::pin(async move {
                debug!(job_type = %name, "Scheduled job fired");
                let request = JobRequest::new(name, serde_json::json!({}));
                match executor.execute(&request).await {
                    Ok(_) => {}
                    Err(JobExecutionError::Transient(msg)) => {
                        warn!(job_id = %request.id, job_type = %request.job_type, "{msg}");
                    }
                    Err(e) => {
                        error!(job_id = %request.id, job_type = %request.job_type, error = %e, "Scheduled job failed");
                    }
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{schedule}' for {job_type}: {e}"
            ))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {job_type} schedule: {e}")))?;

        info!(job_type = %job_type, schedule = %schedule, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use cloudvault_core::error::ErrorKind;

    use super::*;
    use crate::executor::JobHandler;

    #[derive(Debug)]
    struct Noop;

    #[async_trait]
    impl JobHandler for Noop {
        fn job_type(&self) -> &str {
            TRASH_SWEEP_JOB
        }

        async fn execute(&self, _job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
            Ok(None)
        }
    }

    async fn scheduler() -> CronScheduler {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(Noop));
        CronScheduler::new(Arc::new(executor)).await.unwrap()
    }

    #[tokio::test]
    async fn test_registers_default_schedule() {
        let scheduler = scheduler().await;
        scheduler
            .register_default_tasks(&WorkerConfig::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_cron_is_configuration_error() {
        let scheduler = scheduler().await;
        let err = scheduler
            .register(TRASH_SWEEP_JOB, "every midnight")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_unknown_job_is_configuration_error() {
        let scheduler = scheduler().await;
        let err = scheduler.register("reindex", "0 0 0 * * *").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
