//! File upload with quota enforcement and same-name replacement.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use cloudvault_auth::{AccessResolver, Operation};
use cloudvault_core::config::StorageConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::BlobStore;
use cloudvault_core::types::FolderId;
use cloudvault_database::store::TreeStore;
use cloudvault_entity::file::{CreateFile, File};
use cloudvault_entity::node::Node;

use crate::context::RequestContext;
use crate::folder::service::creator_entry;
use crate::node::lookup::{load_target_folder, validate_name};
use crate::storage::StorageService;

/// Content type recorded when the uploader supplies none.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Handles single-request uploads.
#[derive(Clone)]
pub struct UploadService {
    tree: TreeStore,
    blobs: Arc<dyn BlobStore>,
    resolver: AccessResolver,
    storage: StorageService,
    config: StorageConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("provider", &self.blobs.provider_type())
            .finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        tree: TreeStore,
        blobs: Arc<dyn BlobStore>,
        resolver: AccessResolver,
        storage: StorageService,
        config: StorageConfig,
    ) -> Self {
        Self {
            tree,
            blobs,
            resolver,
            storage,
            config,
        }
    }

    /// Uploads a file at root or into `folder_id`.
    ///
    /// The file belongs to the folder's owner and counts against that
    /// owner's quota. A live file of the same name in the same place is
    /// replaced once the new file is recorded. If the old content cannot be
    /// removed the old file is kept and the upload still succeeds.
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        folder_id: Option<FolderId>,
        name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<File> {
        let name = validate_name(name)?;
        if data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        let size = i64::try_from(data.len())
            .map_err(|_| AppError::validation("File size does not fit in 64 bits"))?;

        let owner_id = match folder_id {
            Some(folder_id) => {
                let folder = load_target_folder(&self.tree, folder_id).await?;
                let owner_id = folder.owner_id;
                self.resolver
                    .require(ctx.user_id, &Node::Folder(folder), &Operation::CreateChild)
                    .await?;
                owner_id
            }
            None => ctx.user_id,
        };

        self.storage.ensure_capacity(owner_id, size).await?;

        let content_type = content_type
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let existing = self
            .tree
            .files
            .find_by_name(owner_id, folder_id, &name)
            .await?;

        let handle = self.blobs.put(data, &content_type).await?;

        let record = CreateFile {
            name,
            owner_id,
            folder_id,
            content_handle: handle.clone(),
            size_bytes: size,
            content_type,
            shared_with: creator_entry(ctx, owner_id),
        };

        let file = match self.tree.files.create(&record).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&handle).await {
                    warn!(handle = %handle, error = %cleanup, "Failed to remove orphaned blob");
                }
                return Err(e);
            }
        };

        if let Some(old) = existing {
            self.remove_replaced(&old).await;
        }

        info!(
            user_id = %ctx.user_id,
            owner_id = %file.owner_id,
            file_id = %file.id,
            name = %file.name,
            size = file.size_bytes,
            "File uploaded"
        );

        Ok(file)
    }

    /// Drops the file a new upload replaced.
    ///
    /// The new row already exists, so failures here are logged and do not
    /// fail the upload. The old row is only removed once its blob is gone,
    /// leaving no blob without a row.
    async fn remove_replaced(&self, old: &File) {
        if let Err(e) = self.blobs.delete(&old.content_handle).await {
            warn!(file_id = %old.id, handle = %old.content_handle, error = %e, "Failed to remove replaced blob; keeping its row");
            return;
        }
        if let Err(e) = self.tree.files.delete(old.id).await {
            warn!(file_id = %old.id, error = %e, "Failed to remove replaced file row");
            return;
        }
        info!(file_id = %old.id, name = %old.name, "Replaced existing file");
    }
}
