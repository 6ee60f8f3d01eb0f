//! Rename and move for either node variant.

use tracing::info;

use cloudvault_auth::{AccessResolver, Operation};
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::FolderId;
use cloudvault_database::store::TreeStore;
use cloudvault_entity::node::{Node, NodeId};

use crate::context::RequestContext;

use super::lookup::{load_live_node, load_target_folder, validate_name};

/// Manages in-place node mutations.
#[derive(Debug, Clone)]
pub struct NodeService {
    tree: TreeStore,
    resolver: AccessResolver,
}

impl NodeService {
    /// Creates a new node service.
    pub fn new(tree: TreeStore, resolver: AccessResolver) -> Self {
        Self { tree, resolver }
    }

    /// Renames a live node. A file keeps its current extension.
    pub async fn rename_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        new_name: &str,
    ) -> AppResult<Node> {
        let new_name = validate_name(new_name)?;
        let node = load_live_node(&self.tree, id).await?;

        self.resolver
            .require(ctx.user_id, &node, &Operation::Rename)
            .await?;

        let renamed = match &node {
            Node::File(file) => {
                let name = file.name_with_extension(&new_name);
                Node::File(self.tree.files.rename(file.id, &name).await?)
            }
            Node::Folder(folder) => {
                Node::Folder(self.tree.folders.rename(folder.id, &new_name).await?)
            }
        };

        info!(
            user_id = %ctx.user_id,
            node = %id,
            old_name = %node.name(),
            new_name = %renamed.name(),
            "Node renamed"
        );

        Ok(renamed)
    }

    /// Moves a live node to root or into `destination`.
    ///
    /// The cycle check runs before any permission check and fails with
    /// `InvalidState`.
    pub async fn move_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        destination: Option<FolderId>,
    ) -> AppResult<Node> {
        let node = load_live_node(&self.tree, id).await?;

        let destination = match destination {
            Some(dest_id) => {
                if let Node::Folder(folder) = &node {
                    if self.resolver.would_create_cycle(folder.id, dest_id).await? {
                        return Err(AppError::invalid_state(format!(
                            "Cannot move folder '{}' into itself or one of its subfolders",
                            folder.name
                        )));
                    }
                }
                Some(load_target_folder(&self.tree, dest_id).await?)
            }
            None => None,
        };
        let dest_id = destination.as_ref().map(|f| f.id);

        self.resolver
            .require(ctx.user_id, &node, &Operation::Move { destination })
            .await?;

        let moved = match &node {
            Node::File(file) => Node::File(self.tree.files.set_folder(file.id, dest_id).await?),
            Node::Folder(folder) => {
                Node::Folder(self.tree.folders.set_parent(folder.id, dest_id).await?)
            }
        };

        info!(
            user_id = %ctx.user_id,
            node = %id,
            from = ?node.parent_id(),
            to = ?dest_id,
            "Node moved"
        );

        Ok(moved)
    }
}
