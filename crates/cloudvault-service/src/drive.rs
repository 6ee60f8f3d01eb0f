//! The full operation surface, wired from one set of collaborators.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use cloudvault_auth::AccessResolver;
use cloudvault_core::config::AppConfig;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::{BlobStore, ByteStream};
use cloudvault_core::types::{FileId, FolderId};
use cloudvault_database::store::{TreeStore, UserDirectory};
use cloudvault_entity::file::File;
use cloudvault_entity::folder::Folder;
use cloudvault_entity::node::{Node, NodeId};
use cloudvault_entity::share::{ShareEntry, SharePermission};
use cloudvault_entity::storage::{StorageQuota, StorageStats};

use crate::cascade::{CascadeEngine, CascadeReport};
use crate::context::RequestContext;
use crate::file::{DownloadService, UploadService, ZipExport};
use crate::folder::{FolderListing, FolderService};
use crate::node::NodeService;
use crate::share::{ShareService, SharedListing};
use crate::storage::StorageService;
use crate::trash::{SweepReport, TrashListing, TrashService, TrashSweeper};

/// Every drive operation behind one handle.
#[derive(Debug, Clone)]
pub struct DriveService {
    folders: FolderService,
    nodes: NodeService,
    uploads: UploadService,
    downloads: DownloadService,
    trash: TrashService,
    shares: ShareService,
    storage: StorageService,
    sweeper: TrashSweeper,
}

impl DriveService {
    /// Wire all services over the given collaborators.
    ///
    /// Fails if the trash retention window cannot be represented.
    pub fn new(
        tree: TreeStore,
        blobs: Arc<dyn BlobStore>,
        users: Arc<dyn UserDirectory>,
        config: &AppConfig,
    ) -> AppResult<Self> {
        let retention = config.trash.retention()?;
        let resolver = AccessResolver::new(Arc::clone(&tree.folders));
        let cascade = CascadeEngine::new(tree.clone(), Arc::clone(&blobs));
        let storage = StorageService::new(tree.clone(), config.quota.clone());

        Ok(Self {
            folders: FolderService::new(tree.clone(), resolver.clone()),
            nodes: NodeService::new(tree.clone(), resolver.clone()),
            uploads: UploadService::new(
                tree.clone(),
                Arc::clone(&blobs),
                resolver.clone(),
                storage.clone(),
                config.storage.clone(),
            ),
            downloads: DownloadService::new(tree.clone(), blobs, resolver.clone(), cascade.clone()),
            trash: TrashService::new(tree.clone(), resolver.clone(), cascade.clone()),
            shares: ShareService::new(tree.clone(), users, resolver, cascade.clone()),
            storage,
            sweeper: TrashSweeper::new(tree, cascade, retention),
        })
    }

    /// The retention sweeper, for scheduling.
    pub fn sweeper(&self) -> &TrashSweeper {
        &self.sweeper
    }

    /// The quota accountant.
    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// See [`FolderService::create_folder`].
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent: Option<FolderId>,
    ) -> AppResult<Folder> {
        self.folders.create_folder(ctx, name, parent).await
    }

    /// See [`UploadService::upload_file`].
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        folder: Option<FolderId>,
        name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<File> {
        self.uploads
            .upload_file(ctx, folder, name, content_type, data)
            .await
    }

    /// See [`NodeService::rename_node`].
    pub async fn rename_node(&self, ctx: &RequestContext, id: NodeId, new_name: &str) -> AppResult<Node> {
        self.nodes.rename_node(ctx, id, new_name).await
    }

    /// See [`NodeService::move_node`].
    pub async fn move_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        new_parent: Option<FolderId>,
    ) -> AppResult<Node> {
        self.nodes.move_node(ctx, id, new_parent).await
    }

    /// See [`TrashService::trash_node`].
    pub async fn trash_node(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        self.trash.trash_node(ctx, id).await
    }

    /// See [`TrashService::restore_node`].
    pub async fn restore_node(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        self.trash.restore_node(ctx, id).await
    }

    /// See [`TrashService::permanently_delete_node`].
    pub async fn permanently_delete_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
    ) -> AppResult<CascadeReport> {
        self.trash.permanently_delete_node(ctx, id).await
    }

    /// See [`ShareService::share_node`].
    pub async fn share_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        email: &str,
        permission: SharePermission,
    ) -> AppResult<Node> {
        self.shares.share_node(ctx, id, email, permission).await
    }

    /// See [`ShareService::unshare_node`].
    pub async fn unshare_node(&self, ctx: &RequestContext, id: NodeId, email: &str) -> AppResult<Node> {
        self.shares.unshare_node(ctx, id, email).await
    }

    /// See [`ShareService::list_shared_with`].
    pub async fn list_shared_with(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Vec<ShareEntry>> {
        self.shares.list_shared_with(ctx, id).await
    }

    /// See [`TrashService::empty_trash`].
    pub async fn empty_trash(&self, ctx: &RequestContext) -> AppResult<CascadeReport> {
        self.trash.empty_trash(ctx).await
    }

    /// See [`TrashSweeper::sweep_expired_trash`].
    pub async fn sweep_expired_trash(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        self.sweeper.sweep_expired_trash(now).await
    }

    /// See [`DownloadService::open_file`].
    pub async fn open_file(&self, ctx: &RequestContext, id: FileId) -> AppResult<(File, ByteStream)> {
        self.downloads.open_file(ctx, id).await
    }

    /// See [`DownloadService::export_zip`].
    pub async fn export_zip(&self, ctx: &RequestContext, id: NodeId) -> AppResult<ZipExport> {
        self.downloads.export_zip(ctx, id).await
    }

    /// See [`FolderService::list_folder`].
    pub async fn list_folder(
        &self,
        ctx: &RequestContext,
        parent: Option<FolderId>,
    ) -> AppResult<FolderListing> {
        self.folders.list_folder(ctx, parent).await
    }

    /// See [`TrashService::list_trash`].
    pub async fn list_trash(&self, ctx: &RequestContext) -> AppResult<TrashListing> {
        self.trash.list_trash(ctx).await
    }

    /// See [`ShareService::list_shared_with_me`].
    pub async fn list_shared_with_me(&self, ctx: &RequestContext) -> AppResult<SharedListing> {
        self.shares.list_shared_with_me(ctx).await
    }

    /// See [`StorageService::usage`].
    pub async fn usage(&self, ctx: &RequestContext) -> AppResult<StorageQuota> {
        self.storage.usage(ctx).await
    }

    /// See [`StorageService::storage_stats`].
    pub async fn storage_stats(&self, ctx: &RequestContext) -> AppResult<StorageStats> {
        self.storage.storage_stats(ctx).await
    }
}
