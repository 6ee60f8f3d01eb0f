//! Interactive trash lifecycle operations.

use serde::Serialize;
use tracing::info;

use cloudvault_auth::{AccessResolver, Operation};
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_database::store::TreeStore;
use cloudvault_entity::file::File;
use cloudvault_entity::folder::Folder;
use cloudvault_entity::node::{Node, NodeId};

use crate::cascade::{CascadeEngine, CascadeReport};
use crate::context::RequestContext;
use crate::node::lookup::{load_live_node, load_node};

/// The actor's trashed content, most recently trashed first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrashListing {
    /// Trashed folders.
    pub folders: Vec<Folder>,
    /// Trashed files.
    pub files: Vec<File>,
}

/// Manages trash, restore and permanent deletion.
#[derive(Debug, Clone)]
pub struct TrashService {
    tree: TreeStore,
    resolver: AccessResolver,
    cascade: CascadeEngine,
}

impl TrashService {
    /// Creates a new trash service.
    pub fn new(tree: TreeStore, resolver: AccessResolver, cascade: CascadeEngine) -> Self {
        Self {
            tree,
            resolver,
            cascade,
        }
    }

    /// Trashes a live node and, for a folder, its live subtree.
    pub async fn trash_node(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        let node = load_live_node(&self.tree, id).await?;
        self.resolver
            .require(ctx.user_id, &node, &Operation::Trash)
            .await?;

        let report = self.cascade.trash(&node, ctx.request_time).await?;

        info!(
            user_id = %ctx.user_id,
            node = %id,
            trashed = report.applied,
            "Node moved to trash"
        );

        load_node(&self.tree, id).await
    }

    /// Restores a trashed node and its subtree.
    ///
    /// A trashed parent blocks the restore. A parent that no longer exists
    /// promotes the node to root.
    pub async fn restore_node(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        let node = load_node(&self.tree, id).await?;
        if !node.is_trashed() {
            return Err(AppError::not_found(format!(
                "{} '{}' is not in the trash",
                node.kind(),
                node.name()
            )));
        }

        self.resolver
            .require(ctx.user_id, &node, &Operation::Restore)
            .await?;

        if let Some(parent_id) = node.parent_id() {
            match self.tree.folders.find_by_id(parent_id).await? {
                Some(parent) if parent.is_trashed => {
                    return Err(AppError::invalid_state(format!(
                        "Cannot restore '{}': folder '{}' is in the trash",
                        node.name(),
                        parent.name
                    )));
                }
                Some(parent) => {
                    if parent.owner_id != ctx.user_id && !parent.shared_with.has_access(ctx.user_id)
                    {
                        return Err(AppError::permission_denied(format!(
                            "Cannot restore '{}': no access to folder '{}'",
                            node.name(),
                            parent.name
                        )));
                    }
                }
                None => {
                    self.detach(&node).await?;
                    info!(node = %id, parent_id = %parent_id, "Parent folder gone, restoring to root");
                }
            }
        }

        let report = self.cascade.restore(&node).await?;

        info!(
            user_id = %ctx.user_id,
            node = %id,
            restored = report.applied,
            "Node restored"
        );

        load_node(&self.tree, id).await
    }

    /// Permanently deletes a trashed node. Owner only.
    pub async fn permanently_delete_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
    ) -> AppResult<CascadeReport> {
        let node = load_node(&self.tree, id).await?;
        self.resolver
            .require(ctx.user_id, &node, &Operation::PermanentDelete)
            .await?;

        if !node.is_trashed() {
            return Err(AppError::not_found(format!(
                "{} '{}' is not in the trash",
                node.kind(),
                node.name()
            )));
        }

        let report = self.cascade.purge(&node).await?;

        info!(
            user_id = %ctx.user_id,
            node = %id,
            purged = report.applied,
            detached = report.detached,
            "Node permanently deleted"
        );

        Ok(report)
    }

    /// Permanently deletes everything in the actor's trash, files first.
    pub async fn empty_trash(&self, ctx: &RequestContext) -> AppResult<CascadeReport> {
        let mut report = CascadeReport::default();

        for file in self.tree.files.find_by_owner(ctx.user_id, Some(true)).await? {
            if let Some(current) = self.tree.find_node(file.id.into()).await? {
                if current.is_trashed() {
                    report.merge(self.cascade.purge(&current).await?);
                }
            }
        }
        for folder in self.tree.folders.find_by_owner(ctx.user_id, Some(true)).await? {
            if let Some(current) = self.tree.find_node(folder.id.into()).await? {
                if current.is_trashed() {
                    report.merge(self.cascade.purge(&current).await?);
                }
            }
        }

        info!(
            user_id = %ctx.user_id,
            purged = report.applied,
            detached = report.detached,
            "Trash emptied"
        );

        Ok(report)
    }

    /// The actor's trashed folders and files.
    pub async fn list_trash(&self, ctx: &RequestContext) -> AppResult<TrashListing> {
        let mut folders = self
            .tree
            .folders
            .find_by_owner(ctx.user_id, Some(true))
            .await?;
        let mut files = self
            .tree
            .files
            .find_by_owner(ctx.user_id, Some(true))
            .await?;

        folders.sort_by(|a, b| b.trashed_at.cmp(&a.trashed_at));
        files.sort_by(|a, b| b.trashed_at.cmp(&a.trashed_at));

        Ok(TrashListing { folders, files })
    }

    async fn detach(&self, node: &Node) -> AppResult<()> {
        match node {
            Node::File(file) => self.tree.files.set_folder(file.id, None).await.map(drop),
            Node::Folder(folder) => self.tree.folders.set_parent(folder.id, None).await.map(drop),
        }
    }
}
