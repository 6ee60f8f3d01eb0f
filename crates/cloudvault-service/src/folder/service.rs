//! Folder creation and listing with access checks.

use serde::Serialize;
use tracing::info;

use cloudvault_auth::{AccessResolver, Operation};
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{FolderId, UserId};
use cloudvault_database::store::TreeStore;
use cloudvault_entity::file::File;
use cloudvault_entity::folder::{CreateFolder, Folder};
use cloudvault_entity::node::Node;
use cloudvault_entity::share::{ShareEntry, ShareList, SharePermission};

use crate::context::RequestContext;
use crate::node::lookup::{load_live_node, load_target_folder, validate_name};

/// Live contents of one folder, or of the actor's root level.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderListing {
    /// Child folders, by name.
    pub folders: Vec<Folder>,
    /// Child files, by name.
    pub files: Vec<File>,
}

/// Manages folder creation and listing.
#[derive(Debug, Clone)]
pub struct FolderService {
    tree: TreeStore,
    resolver: AccessResolver,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(tree: TreeStore, resolver: AccessResolver) -> Self {
        Self { tree, resolver }
    }

    /// Creates a folder at root or inside `parent_id`.
    ///
    /// A folder created inside someone else's folder belongs to that
    /// folder's owner; the creator receives an editor entry on it.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> AppResult<Folder> {
        let name = validate_name(name)?;

        let owner_id = match parent_id {
            Some(parent_id) => {
                let parent = load_target_folder(&self.tree, parent_id).await?;
                let owner_id = parent.owner_id;
                self.resolver
                    .require(ctx.user_id, &Node::Folder(parent), &Operation::CreateChild)
                    .await?;
                owner_id
            }
            None => ctx.user_id,
        };

        let folder = self
            .tree
            .folders
            .create(&CreateFolder {
                name,
                owner_id,
                parent_id,
                shared_with: creator_entry(ctx, owner_id),
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            owner_id = %folder.owner_id,
            name = %folder.name,
            "Folder created"
        );

        Ok(folder)
    }

    /// Lists the live children of `parent_id`, or the actor's own root
    /// level when `None`.
    pub async fn list_folder(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
    ) -> AppResult<FolderListing> {
        let Some(parent_id) = parent_id else {
            return Ok(FolderListing {
                folders: self.tree.folders.find_roots(ctx.user_id).await?,
                files: self.tree.files.find_roots(ctx.user_id).await?,
            });
        };

        let parent = load_live_node(&self.tree, parent_id.into()).await?;
        self.resolver
            .require(ctx.user_id, &parent, &Operation::Read)
            .await?;

        let (folders, files) = self.tree.children_of(parent_id).await?;
        Ok(FolderListing {
            folders: folders.into_iter().filter(|f| !f.is_trashed).collect(),
            files: files.into_iter().filter(|f| !f.is_trashed).collect(),
        })
    }
}

/// The editor entry a non-owner creator receives on new content.
pub(crate) fn creator_entry(ctx: &RequestContext, owner_id: UserId) -> ShareList {
    let mut shares = ShareList::new();
    if ctx.user_id != owner_id {
        shares.upsert(ShareEntry {
            user_id: ctx.user_id,
            email: ctx.email.clone(),
            permission: SharePermission::Editor,
        });
    }
    shares
}
