//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudvault_core::types::{FolderId, UserId};

use crate::share::ShareList;

/// A folder in an owner's forest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// The folder owner. Never changes after creation.
    pub owner_id: UserId,
    /// Parent folder ID (`None` for root folders).
    pub parent_id: Option<FolderId>,
    /// Soft-delete flag.
    pub is_trashed: bool,
    /// When the folder was trashed.
    pub trashed_at: Option<DateTime<Utc>>,
    /// Direct share entries.
    #[sqlx(json)]
    pub shared_with: ShareList,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Enter the trashed state.
    pub fn mark_trashed(&mut self, now: DateTime<Utc>) {
        self.is_trashed = true;
        self.trashed_at = Some(now);
    }

    /// Leave the trashed state.
    pub fn mark_restored(&mut self) {
        self.is_trashed = false;
        self.trashed_at = None;
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// The folder owner.
    pub owner_id: UserId,
    /// Parent folder (`None` for root).
    pub parent_id: Option<FolderId>,
    /// Initial share entries.
    pub shared_with: ShareList,
}
