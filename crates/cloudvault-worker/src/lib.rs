//! Scheduled lifecycle jobs for CloudVault.
//!
//! This crate provides:
//! - A job executor that dispatches job requests to registered handlers
//! - The expired-trash sweep as a job handler
//! - A cron scheduler that fires registered jobs on their schedules

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler, JobRequest};
pub use scheduler::CronScheduler;
