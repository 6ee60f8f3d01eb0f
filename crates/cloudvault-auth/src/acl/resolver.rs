//! Access resolver: loads what the decision table needs, then decides.

use std::sync::Arc;

use tracing::debug;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{FolderId, UserId};
use cloudvault_database::store::FolderStore;
use cloudvault_entity::node::Node;

use super::operation::Operation;
use super::policy::{Decision, PathContext, decide};
use super::walker::AncestorWalker;

/// The single gate for every mutation of the node tree.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    folders: Arc<dyn FolderStore>,
}

impl AccessResolver {
    /// Create a resolver reading folders from `folders`.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// A fresh walker sharing this resolver's store.
    pub fn walker(&self) -> AncestorWalker {
        AncestorWalker::new(Arc::clone(&self.folders))
    }

    /// Decide whether `actor` may perform `operation` on `node`.
    ///
    /// Owners never trigger an ancestor walk. Non-owners trigger one only
    /// for path-sensitive operations on nodes that have a parent.
    pub async fn can_mutate(
        &self,
        actor: UserId,
        node: &Node,
        operation: &Operation,
    ) -> AppResult<Decision> {
        let mut path = PathContext::default();

        if !node.is_owned_by(actor) && operation.walks_source_path() {
            let mut walker = self.walker();
            if let Some(parent) = node.parent_id() {
                path.source_chain = walker.chain_from(Some(parent)).await?;
            }
            if let Some(dest) = operation.destination() {
                path.target_chain = walker.chain_from(Some(dest.id)).await?;
            }
        }

        let decision = decide(actor, node, operation, &path);
        debug!(
            actor = %actor,
            node = %node.id(),
            operation = operation.as_str(),
            allowed = decision.is_allowed(),
            "Access decision"
        );
        Ok(decision)
    }

    /// Like [`Self::can_mutate`], but a denial becomes `PermissionDenied`.
    pub async fn require(&self, actor: UserId, node: &Node, operation: &Operation) -> AppResult<()> {
        match self.can_mutate(actor, node, operation).await? {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::permission_denied(format!(
                "Cannot {operation} {} '{}': {reason}",
                node.kind(),
                node.name()
            ))),
        }
    }

    /// Whether moving `folder` under `destination` would make it its own
    /// descendant.
    pub async fn would_create_cycle(
        &self,
        folder: FolderId,
        destination: FolderId,
    ) -> AppResult<bool> {
        if folder == destination {
            return Ok(true);
        }
        self.walker().is_within(destination, folder).await
    }
}
