//! Share, unshare and share listings.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use cloudvault_auth::{AccessResolver, Operation};
use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_database::store::{TreeStore, UserDirectory};
use cloudvault_entity::file::File;
use cloudvault_entity::folder::Folder;
use cloudvault_entity::node::{Node, NodeId};
use cloudvault_entity::share::{ShareEntry, SharePermission};
use cloudvault_entity::user::UserAccount;

use crate::cascade::CascadeEngine;
use crate::context::RequestContext;
use crate::node::lookup::{load_live_node, load_node};

/// Live content carrying a share entry for the actor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SharedListing {
    /// Shared folders.
    pub folders: Vec<Folder>,
    /// Shared files.
    pub files: Vec<File>,
}

/// Manages share entries.
#[derive(Debug, Clone)]
pub struct ShareService {
    tree: TreeStore,
    users: Arc<dyn UserDirectory>,
    resolver: AccessResolver,
    cascade: CascadeEngine,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        tree: TreeStore,
        users: Arc<dyn UserDirectory>,
        resolver: AccessResolver,
        cascade: CascadeEngine,
    ) -> Self {
        Self {
            tree,
            users,
            resolver,
            cascade,
        }
    }

    /// Grants `permission` to the user registered under `email` on a live
    /// node and everything currently below it. Owner only.
    ///
    /// Sharing the same user again updates the permission in place.
    pub async fn share_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        email: &str,
        permission: SharePermission,
    ) -> AppResult<Node> {
        let node = load_live_node(&self.tree, id).await?;
        self.resolver
            .require(ctx.user_id, &node, &Operation::Share)
            .await?;

        let target = self.resolve_user(email).await?;
        if target.id == node.owner_id() {
            return Err(AppError::validation("Cannot share an item with its owner"));
        }
        if !target.is_active {
            return Err(AppError::validation(format!(
                "Account '{}' is inactive",
                target.email
            )));
        }

        let entry = ShareEntry {
            user_id: target.id,
            email: target.email.clone(),
            permission,
        };
        let report = self.cascade.share(&node, &entry).await?;

        info!(
            user_id = %ctx.user_id,
            node = %id,
            target_user_id = %target.id,
            permission = %permission,
            updated = report.applied,
            "Node shared"
        );

        load_node(&self.tree, id).await
    }

    /// Removes the user registered under `email` from a node and everything
    /// currently below it. Owner only.
    pub async fn unshare_node(&self, ctx: &RequestContext, id: NodeId, email: &str) -> AppResult<Node> {
        let node = load_node(&self.tree, id).await?;
        self.resolver
            .require(ctx.user_id, &node, &Operation::Unshare)
            .await?;

        let target = self.resolve_user(email).await?;
        let report = self.cascade.unshare(&node, target.id).await?;

        info!(
            user_id = %ctx.user_id,
            node = %id,
            target_user_id = %target.id,
            updated = report.applied,
            "Node unshared"
        );

        load_node(&self.tree, id).await
    }

    /// The direct share entries of a node. Owner only.
    pub async fn list_shared_with(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Vec<ShareEntry>> {
        let node = load_node(&self.tree, id).await?;
        self.resolver
            .require(ctx.user_id, &node, &Operation::ListShares)
            .await?;
        Ok(node.shared_with().iter().cloned().collect())
    }

    /// Live files and folders that carry an entry for the actor.
    pub async fn list_shared_with_me(&self, ctx: &RequestContext) -> AppResult<SharedListing> {
        Ok(SharedListing {
            folders: self.tree.folders.find_shared_with(ctx.user_id).await?,
            files: self.tree.files.find_shared_with(ctx.user_id).await?,
        })
    }

    async fn resolve_user(&self, email: &str) -> AppResult<UserAccount> {
        self.users
            .find_by_email(email)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Identity => e,
                _ => AppError::with_source(ErrorKind::Identity, "User directory lookup failed", e),
            })?
            .ok_or_else(|| AppError::not_found(format!("No user registered with email '{email}'")))
    }
}
