//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudvault_core::types::{FileId, FolderId, UserId};

use crate::share::ShareList;
use crate::storage::FileCategory;

/// A file node. Content lives in the blob store under `content_handle`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// Display name, including the extension.
    pub name: String,
    /// The owner bearing the quota cost. Never changes after creation.
    pub owner_id: UserId,
    /// Containing folder, or `None` at root.
    pub folder_id: Option<FolderId>,
    /// Handle into the blob store.
    pub content_handle: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// MIME type supplied at upload.
    pub content_type: String,
    /// Soft-delete flag.
    pub is_trashed: bool,
    /// When the file was trashed. Set exactly when `is_trashed` is.
    pub trashed_at: Option<DateTime<Utc>>,
    /// Direct share entries.
    #[sqlx(json)]
    pub shared_with: ShareList,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// The extension including its leading dot, as written in the name.
    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.name)
    }

    /// Apply a user-supplied new name, keeping the current extension
    /// verbatim when the new name does not already end with it. The
    /// comparison is case-sensitive.
    pub fn name_with_extension(&self, new_name: &str) -> String {
        let new_name = new_name.trim();
        match self.extension() {
            Some(ext) if !new_name.ends_with(ext) => {
                format!("{new_name}{ext}")
            }
            _ => new_name.to_string(),
        }
    }

    /// Statistics bucket for this file's content type.
    pub fn category(&self) -> FileCategory {
        FileCategory::from_content_type(&self.content_type)
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

fn extension_of(name: &str) -> Option<&str> {
    let dot = name.rfind('.')?;
    if dot == 0 || dot + 1 == name.len() {
        return None;
    }
    Some(&name[dot..])
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// File name.
    pub name: String,
    /// Owner (the containing folder's owner).
    pub owner_id: UserId,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// Blob handle returned by the store.
    pub content_handle: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub content_type: String,
    /// Initial share entries.
    pub shared_with: ShareList,
}
