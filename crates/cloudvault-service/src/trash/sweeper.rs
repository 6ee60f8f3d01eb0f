//! Retention sweep: purge trash older than the retention window.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_database::store::TreeStore;
use cloudvault_entity::node::{Node, NodeId};

use crate::cascade::CascadeEngine;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Nodes trashed at or before this instant were candidates.
    pub cutoff: Option<DateTime<Utc>>,
    /// Files purged as candidates.
    pub files_purged: usize,
    /// Folders purged as candidates, including their trashed subtrees.
    pub folders_purged: usize,
    /// Candidates already gone or restored by the time they were reached.
    pub skipped: usize,
    /// Candidates whose purge failed.
    pub failed: usize,
}

/// Best-effort purge of expired trash.
#[derive(Debug, Clone)]
pub struct TrashSweeper {
    tree: TreeStore,
    cascade: CascadeEngine,
    retention: Duration,
}

impl TrashSweeper {
    /// Creates a sweeper with the given retention window.
    pub fn new(tree: TreeStore, cascade: CascadeEngine, retention: Duration) -> Self {
        Self {
            tree,
            cascade,
            retention,
        }
    }

    /// The retention window.
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Purge every node with `trashed_at <= now - retention`.
    ///
    /// Files go first, then folders. A failure is logged and counted and the
    /// sweep moves on to the next candidate. Only a failure to list the
    /// candidates aborts the sweep.
    pub async fn sweep_expired_trash(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let cutoff = now.checked_sub_signed(self.retention).ok_or_else(|| {
            AppError::configuration(format!(
                "Retention of {} days reaches before the earliest representable time",
                self.retention.num_days()
            ))
        })?;
        let mut report = SweepReport {
            cutoff: Some(cutoff),
            ..SweepReport::default()
        };

        let files = self.tree.files.find_trashed_before(cutoff).await?;
        let folders = self.tree.folders.find_trashed_before(cutoff).await?;

        let candidates = files
            .iter()
            .map(|f| NodeId::File(f.id))
            .chain(folders.iter().map(|f| NodeId::Folder(f.id)));

        for id in candidates {
            match self.sweep_one(id, cutoff).await {
                Ok(true) => match id {
                    NodeId::File(_) => report.files_purged += 1,
                    NodeId::Folder(_) => report.folders_purged += 1,
                },
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(node = %id, error = %e, "Failed to purge expired trash");
                }
            }
        }

        info!(
            cutoff = %cutoff,
            files = report.files_purged,
            folders = report.folders_purged,
            skipped = report.skipped,
            failed = report.failed,
            "Trash sweep finished"
        );

        Ok(report)
    }

    /// Re-read the candidate and purge it if it is still expired.
    async fn sweep_one(&self, id: NodeId, cutoff: DateTime<Utc>) -> AppResult<bool> {
        let Some(node) = self.tree.find_node(id).await? else {
            return Ok(false);
        };
        if !is_expired(&node, cutoff) {
            return Ok(false);
        }
        self.cascade.purge(&node).await?;
        Ok(true)
    }
}

fn is_expired(node: &Node, cutoff: DateTime<Utc>) -> bool {
    node.is_trashed() && node.trashed_at().is_some_and(|t| t <= cutoff)
}
