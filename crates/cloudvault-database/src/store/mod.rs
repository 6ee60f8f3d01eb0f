//! Store traits consumed by the access resolver and cascade engine.
//!
//! Every mutation primitive writes one field group on one row and returns
//! the row as written. There are no multi-row transactions: concurrent
//! writers to the same field resolve last-writer-wins.

pub mod tree;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{FileId, FolderId, UserId};
use cloudvault_entity::file::{CreateFile, File};
use cloudvault_entity::folder::{CreateFolder, Folder};
use cloudvault_entity::share::ShareList;
use cloudvault_entity::user::UserAccount;

pub use tree::TreeStore;

/// Folder rows.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID, trashed or not.
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Direct child folders of `parent_id`, trashed or not.
    async fn find_children(&self, parent_id: FolderId) -> AppResult<Vec<Folder>>;

    /// Non-trashed root folders of `owner_id`.
    async fn find_roots(&self, owner_id: UserId) -> AppResult<Vec<Folder>>;

    /// Folders of `owner_id`, optionally filtered by trash state.
    async fn find_by_owner(&self, owner_id: UserId, trashed: Option<bool>)
    -> AppResult<Vec<Folder>>;

    /// Non-trashed folders carrying a share entry for `user_id`.
    async fn find_shared_with(&self, user_id: UserId) -> AppResult<Vec<Folder>>;

    /// Trashed folders whose `trashed_at` is at or before `cutoff`.
    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Folder>>;

    /// Insert a new folder.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Overwrite the name.
    async fn rename(&self, id: FolderId, name: &str) -> AppResult<Folder>;

    /// Overwrite the parent.
    async fn set_parent(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder>;

    /// Overwrite the lifecycle state. `Some(t)` trashes at `t`, `None` restores.
    async fn set_trashed(
        &self,
        id: FolderId,
        trashed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Folder>;

    /// Overwrite the share list.
    async fn set_shared_with(&self, id: FolderId, shared_with: &ShareList) -> AppResult<Folder>;

    /// Delete the row. Returns `false` if it was already gone.
    async fn delete(&self, id: FolderId) -> AppResult<bool>;
}

/// File rows.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a file by ID, trashed or not.
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>>;

    /// Files directly inside `folder_id`, trashed or not.
    async fn find_in_folder(&self, folder_id: FolderId) -> AppResult<Vec<File>>;

    /// Non-trashed root-level files of `owner_id`.
    async fn find_roots(&self, owner_id: UserId) -> AppResult<Vec<File>>;

    /// Files of `owner_id`, optionally filtered by trash state.
    async fn find_by_owner(&self, owner_id: UserId, trashed: Option<bool>) -> AppResult<Vec<File>>;

    /// The non-trashed file named `name` in `folder_id` owned by `owner_id`.
    async fn find_by_name(
        &self,
        owner_id: UserId,
        folder_id: Option<FolderId>,
        name: &str,
    ) -> AppResult<Option<File>>;

    /// Non-trashed files carrying a share entry for `user_id`.
    async fn find_shared_with(&self, user_id: UserId) -> AppResult<Vec<File>>;

    /// Trashed files whose `trashed_at` is at or before `cutoff`.
    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<File>>;

    /// Sum of `size_bytes` over the owner's non-trashed files.
    async fn sum_active_size(&self, owner_id: UserId) -> AppResult<i64>;

    /// Insert a new file.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Overwrite the name.
    async fn rename(&self, id: FileId, name: &str) -> AppResult<File>;

    /// Overwrite the containing folder.
    async fn set_folder(&self, id: FileId, folder_id: Option<FolderId>) -> AppResult<File>;

    /// Overwrite the lifecycle state. `Some(t)` trashes at `t`, `None` restores.
    async fn set_trashed(&self, id: FileId, trashed_at: Option<DateTime<Utc>>) -> AppResult<File>;

    /// Overwrite the share list.
    async fn set_shared_with(&self, id: FileId, shared_with: &ShareList) -> AppResult<File>;

    /// Delete the row. Returns `false` if it was already gone.
    async fn delete(&self, id: FileId) -> AppResult<bool>;
}

/// Read access to user accounts, owned by the identity collaborator.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Find an account by ID.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<UserAccount>>;

    /// Find an account by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserAccount>>;
}
