//! Storage quota accountant.

use tracing::warn;

use cloudvault_core::config::QuotaConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::UserId;
use cloudvault_database::store::TreeStore;
use cloudvault_entity::storage::{StorageQuota, StorageStats};

use crate::context::RequestContext;

/// Computes usage on demand from the file rows; nothing is cached.
#[derive(Debug, Clone)]
pub struct StorageService {
    tree: TreeStore,
    config: QuotaConfig,
}

impl StorageService {
    /// Creates a new storage service.
    pub fn new(tree: TreeStore, config: QuotaConfig) -> Self {
        Self { tree, config }
    }

    /// The configured cap in bytes.
    pub fn cap(&self) -> i64 {
        self.config.max_storage_bytes
    }

    /// Bytes held by `owner`'s non-trashed files.
    pub async fn used_bytes(&self, owner: UserId) -> AppResult<i64> {
        self.tree.files.sum_active_size(owner).await
    }

    /// `owner`'s quota report.
    pub async fn quota_for(&self, owner: UserId) -> AppResult<StorageQuota> {
        let used = self.used_bytes(owner).await?;
        Ok(StorageQuota::new(self.cap(), used))
    }

    /// Reject with `QuotaExceeded` if `additional` bytes would take `owner`
    /// past the cap.
    pub async fn ensure_capacity(&self, owner: UserId, additional: i64) -> AppResult<()> {
        let quota = self.quota_for(owner).await?;
        if quota.would_exceed(additional) {
            warn!(
                owner_id = %owner,
                used = quota.used_bytes,
                requested = additional,
                cap = quota.total_bytes,
                "Upload rejected by quota"
            );
            return Err(AppError::quota_exceeded(format!(
                "Storage quota exceeded: {} of {} bytes used, {additional} more requested",
                quota.used_bytes, quota.total_bytes
            )));
        }
        Ok(())
    }

    /// The actor's quota report.
    pub async fn usage(&self, ctx: &RequestContext) -> AppResult<StorageQuota> {
        self.quota_for(ctx.user_id).await
    }

    /// The actor's active and trashed content, broken down by file category.
    pub async fn storage_stats(&self, ctx: &RequestContext) -> AppResult<StorageStats> {
        self.stats_for(ctx.user_id).await
    }

    /// Statistics for any owner.
    pub async fn stats_for(&self, owner: UserId) -> AppResult<StorageStats> {
        let mut stats = StorageStats::default();

        for file in self.tree.files.find_by_owner(owner, None).await? {
            let bucket = if file.is_trashed {
                &mut stats.trash
            } else {
                &mut stats.active
            };
            bucket.add_file(file.category(), file.size_bytes);
        }
        for folder in self.tree.folders.find_by_owner(owner, None).await? {
            if folder.is_trashed {
                stats.trash.folders += 1;
            } else {
                stats.active.folders += 1;
            }
        }

        Ok(stats)
    }
}
