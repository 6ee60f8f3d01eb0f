//! Shared test helpers for drive integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;

use cloudvault_core::config::AppConfig;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{FileId, FolderId};
use cloudvault_database::TreeStore;
use cloudvault_database::memory::MemoryUserDirectory;
use cloudvault_entity::file::File;
use cloudvault_entity::folder::Folder;
use cloudvault_entity::share::SharePermission;
use cloudvault_service::{DriveService, RequestContext};
use cloudvault_storage::MemoryBlobStore;

/// A drive over in-memory stores.
pub struct TestDrive {
    /// The drive under test.
    pub drive: DriveService,
    /// Direct store access for assertions and fault setup.
    pub tree: TreeStore,
    /// The blob store, with failure injection.
    pub blobs: MemoryBlobStore,
    /// Registered accounts.
    pub users: MemoryUserDirectory,
    /// Config used to build the drive.
    pub config: AppConfig,
}

impl TestDrive {
    /// Create a drive with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a drive with the given quota cap.
    pub fn with_quota(max_storage_bytes: i64) -> Self {
        let mut config = AppConfig::default();
        config.quota.max_storage_bytes = max_storage_bytes;
        Self::with_config(config)
    }

    /// Create a drive with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self::try_with_config(config).unwrap()
    }

    /// Create a drive, surfacing configuration errors.
    pub fn try_with_config(config: AppConfig) -> AppResult<Self> {
        let tree = TreeStore::in_memory();
        let blobs = MemoryBlobStore::new();
        let users = MemoryUserDirectory::new();
        let drive = DriveService::new(
            tree.clone(),
            Arc::new(blobs.clone()),
            Arc::new(users.clone()),
            &config,
        )?;
        Ok(Self {
            drive,
            tree,
            blobs,
            users,
            config,
        })
    }

    /// Register a user and return a request context for them.
    pub fn user(&self, email: &str) -> RequestContext {
        let name = email.split('@').next().unwrap_or(email);
        let account = self.users.register(email, name);
        RequestContext::for_account(&account)
    }

    /// Create a folder, panicking on failure.
    pub async fn folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent: Option<FolderId>,
    ) -> Folder {
        self.drive.create_folder(ctx, name, parent).await.unwrap()
    }

    /// Upload a text file, panicking on failure.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        folder: Option<FolderId>,
        name: &str,
        content: &str,
    ) -> File {
        self.drive
            .upload_file(
                ctx,
                folder,
                name,
                Some("text/plain"),
                Bytes::from(content.to_string()),
            )
            .await
            .unwrap()
    }

    /// Upload `size` zero bytes.
    pub async fn upload_sized(
        &self,
        ctx: &RequestContext,
        folder: Option<FolderId>,
        name: &str,
        size: usize,
    ) -> cloudvault_core::AppResult<File> {
        self.drive
            .upload_file(
                ctx,
                folder,
                name,
                Some("application/octet-stream"),
                Bytes::from(vec![0u8; size]),
            )
            .await
    }

    /// Share a folder as `permission`, panicking on failure.
    pub async fn share_folder(
        &self,
        owner: &RequestContext,
        folder: FolderId,
        with: &RequestContext,
        permission: SharePermission,
    ) {
        self.drive
            .share_node(owner, folder.into(), &with.email, permission)
            .await
            .unwrap();
    }

    /// Current folder row, if any.
    pub async fn folder_row(&self, id: FolderId) -> Option<Folder> {
        self.tree.folders.find_by_id(id).await.unwrap()
    }

    /// Current file row, if any.
    pub async fn file_row(&self, id: FileId) -> Option<File> {
        self.tree.files.find_by_id(id).await.unwrap()
    }
}
