//! Expired-trash sweep job handler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use cloudvault_service::TrashSweeper;

use crate::executor::{JobExecutionError, JobHandler, JobRequest};

/// Job type key for the sweep.
pub const TRASH_SWEEP_JOB: &str = "trash_sweep";

/// Purges trash older than the retention window.
///
/// The payload may carry `{"now": "<RFC 3339>"}` to sweep as of a fixed
/// instant; otherwise the current time is used.
#[derive(Debug, Clone)]
pub struct TrashSweepJobHandler {
    sweeper: TrashSweeper,
}

impl TrashSweepJobHandler {
    /// Create a new sweep handler
    pub fn new(sweeper: TrashSweeper) -> Self {
        Self { sweeper }
    }

    fn sweep_time(payload: &Value) -> Result<DateTime<Utc>, JobExecutionError> {
        match payload.get("now").and_then(Value::as_str) {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| JobExecutionError::Permanent(format!("Invalid sweep time '{raw}': {e}"))),
            None => Ok(Utc::now()),
        }
    }
}

#[async_trait]
impl JobHandler for TrashSweepJobHandler {
    fn job_type(&self) -> &str {
        TRASH_SWEEP_JOB
    }

    async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
        let now = Self::sweep_time(&job.payload)?;

        let report = self
            .sweeper
            .sweep_expired_trash(now)
            .await
            .map_err(JobExecutionError::from_app_error)?;

        info!(
            job_id = %job.id,
            files_purged = report.files_purged,
            folders_purged = report.folders_purged,
            skipped = report.skipped,
            failed = report.failed,
            "Trash sweep finished"
        );

        let summary = serde_json::to_value(&report).map_err(cloudvault_core::AppError::from)?;
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use chrono::Duration;

    use cloudvault_core::traits::BlobStore;
    use cloudvault_core::types::UserId;
    use cloudvault_database::TreeStore;
    use cloudvault_entity::file::CreateFile;
    use cloudvault_entity::share::ShareList;
    use cloudvault_service::CascadeEngine;
    use cloudvault_storage::MemoryBlobStore;

    use super::*;

    async fn seed_trashed_file(
        tree: &TreeStore,
        blobs: &MemoryBlobStore,
        trashed_at: DateTime<Utc>,
    ) {
        let handle = blobs.put(Bytes::from_static(b"old"), "text/plain").await.unwrap();
        let file = tree
            .files
            .create(&CreateFile {
                name: "old.txt".to_string(),
                owner_id: UserId::new(),
                folder_id: None,
                content_handle: handle,
                size_bytes: 3,
                content_type: "text/plain".to_string(),
                shared_with: ShareList::default(),
            })
            .await
            .unwrap();
        tree.files.set_trashed(file.id, Some(trashed_at)).await.unwrap();
    }

    fn handler(tree: &TreeStore, blobs: &MemoryBlobStore) -> TrashSweepJobHandler {
        let cascade = CascadeEngine::new(tree.clone(), Arc::new(blobs.clone()));
        TrashSweepJobHandler::new(TrashSweeper::new(tree.clone(), cascade, Duration::days(30)))
    }

    #[tokio::test]
    async fn test_sweep_as_of_payload_time() {
        let tree = TreeStore::in_memory();
        let blobs = MemoryBlobStore::new();
        let trashed_at = Utc::now() - Duration::days(10);
        seed_trashed_file(&tree, &blobs, trashed_at).await;
        let handler = handler(&tree, &blobs);

        let job = JobRequest::new(TRASH_SWEEP_JOB, Value::Null);
        let out = handler.execute(&job).await.unwrap().unwrap();
        assert_eq!(out["files_purged"], 0);
        assert_eq!(blobs.len(), 1);

        let later = (trashed_at + Duration::days(31)).to_rfc3339();
        let job = JobRequest::new(TRASH_SWEEP_JOB, serde_json::json!({ "now": later }));
        let out = handler.execute(&job).await.unwrap().unwrap();
        assert_eq!(out["files_purged"], 1);
        assert_eq!(out["failed"], 0);
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_time_is_permanent() {
        let tree = TreeStore::in_memory();
        let blobs = MemoryBlobStore::new();
        let handler = handler(&tree, &blobs);

        let job = JobRequest::new(TRASH_SWEEP_JOB, serde_json::json!({ "now": "yesterday" }));
        let err = handler.execute(&job).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
