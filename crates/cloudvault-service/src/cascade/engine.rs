//! Cascade engine: trash, restore, purge, share and export over a subtree.
//!
//! Traversals are iterative and address nodes only by id. Children are
//! re-read from the store at every step, so structural changes made by
//! concurrent operations are picked up rather than overwritten from a stale
//! snapshot. A descendant deleted between listing and writing is skipped.
//! Each step commits on its own; the first failing step stops the cascade
//! and its error is returned, leaving earlier steps applied.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use cloudvault_auth::{Operation, PathContext, decide};
use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::BlobStore;
use cloudvault_core::types::{FolderId, UserId};
use cloudvault_database::store::TreeStore;
use cloudvault_entity::file::File;
use cloudvault_entity::folder::Folder;
use cloudvault_entity::node::{Node, NodeId};
use cloudvault_entity::share::{ShareEntry, ShareList};

/// Counters for one cascade, used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Nodes examined.
    pub visited: usize,
    /// Nodes whose state was written.
    pub applied: usize,
    /// Live nodes moved to root because their folder was purged.
    pub detached: usize,
}

impl CascadeReport {
    fn record(&mut self, applied: bool) {
        self.visited += 1;
        if applied {
            self.applied += 1;
        }
    }

    /// Add another report's counters to this one.
    pub fn merge(&mut self, other: CascadeReport) {
        self.visited += other.visited;
        self.applied += other.applied;
        self.detached += other.detached;
    }
}

/// One entry of a subtree export, in pre-order.
#[derive(Debug, Clone)]
pub enum ExportEntry {
    /// A folder, as a path ending in `/`.
    Directory {
        /// Archive path.
        path: String,
    },
    /// A file and the archive path it is written under.
    File {
        /// Archive path.
        path: String,
        /// The file row.
        file: File,
    },
}

/// Depth-first frontier that refuses to visit a folder twice.
struct Frontier {
    stack: Vec<FolderId>,
    seen: HashSet<FolderId>,
}

impl Frontier {
    fn new(root: FolderId) -> Self {
        Self {
            stack: vec![root],
            seen: HashSet::from([root]),
        }
    }

    fn push(&mut self, id: FolderId) -> AppResult<()> {
        if !self.seen.insert(id) {
            return Err(AppError::invalid_state(format!(
                "Folder {id} appears twice in one subtree"
            )));
        }
        self.stack.push(id);
        Ok(())
    }

    fn pop(&mut self) -> Option<FolderId> {
        self.stack.pop()
    }
}

/// Applies subtree operations through the tree node store.
///
/// Performs no authorization: callers check the root of the operation.
#[derive(Debug, Clone)]
pub struct CascadeEngine {
    tree: TreeStore,
    blobs: Arc<dyn BlobStore>,
}

impl CascadeEngine {
    /// Creates a new cascade engine.
    pub fn new(tree: TreeStore, blobs: Arc<dyn BlobStore>) -> Self {
        Self { tree, blobs }
    }

    /// Trash `node` and every live node below it.
    ///
    /// Children that are already trashed are left alone together with their
    /// subtree, so they keep their original `trashed_at`.
    pub async fn trash(&self, node: &Node, now: DateTime<Utc>) -> AppResult<CascadeReport> {
        let mut report = CascadeReport::default();
        self.set_trashed(node.id(), Some(now)).await?;
        report.record(true);

        let Node::Folder(root) = node else {
            return Ok(report);
        };

        let mut frontier = Frontier::new(root.id);
        while let Some(folder_id) = frontier.pop() {
            let (folders, files) = self.tree.children_of(folder_id).await?;

            for file in files.iter().filter(|f| !f.is_trashed) {
                let written =
                    skip_vanished(file.id, self.tree.files.set_trashed(file.id, Some(now)).await)?;
                report.record(written);
            }
            for child in folders.iter().filter(|f| !f.is_trashed) {
                let written = skip_vanished(
                    child.id,
                    self.tree.folders.set_trashed(child.id, Some(now)).await,
                )?;
                report.record(written);
                if written {
                    frontier.push(child.id)?;
                }
            }
        }

        debug!(node = %node.id(), applied = report.applied, "Trash cascade finished");
        Ok(report)
    }

    /// Restore `node` and every trashed node below it.
    pub async fn restore(&self, node: &Node) -> AppResult<CascadeReport> {
        let mut report = CascadeReport::default();
        self.set_trashed(node.id(), None).await?;
        report.record(true);

        let Node::Folder(root) = node else {
            return Ok(report);
        };

        let mut frontier = Frontier::new(root.id);
        while let Some(folder_id) = frontier.pop() {
            let (folders, files) = self.tree.children_of(folder_id).await?;

            for file in &files {
                let mut written = false;
                if file.is_trashed {
                    written =
                        skip_vanished(file.id, self.tree.files.set_trashed(file.id, None).await)?;
                }
                report.record(written);
            }
            for child in &folders {
                let mut present = true;
                if child.is_trashed {
                    present = skip_vanished(
                        child.id,
                        self.tree.folders.set_trashed(child.id, None).await,
                    )?;
                }
                report.record(child.is_trashed && present);
                if present {
                    frontier.push(child.id)?;
                }
            }
        }

        debug!(node = %node.id(), applied = report.applied, "Restore cascade finished");
        Ok(report)
    }

    /// Permanently delete `node` and every trashed node below it.
    ///
    /// Folders are removed post-order, children before their folder. Within
    /// a folder, trashed files lose their blob first and their row second.
    /// Live descendants are detached to root instead of being deleted.
    /// Re-invoking after a failure resumes where the previous run stopped.
    pub async fn purge(&self, node: &Node) -> AppResult<CascadeReport> {
        let mut report = CascadeReport::default();

        let root = match node {
            Node::File(file) => {
                self.purge_file(file).await?;
                report.record(true);
                return Ok(report);
            }
            Node::Folder(folder) => folder,
        };

        let mut order = Vec::new();
        let mut frontier = Frontier::new(root.id);
        while let Some(folder_id) = frontier.pop() {
            order.push(folder_id);
            for child in self.tree.folders.find_children(folder_id).await? {
                if child.is_trashed {
                    frontier.push(child.id)?;
                }
            }
        }

        for folder_id in order.into_iter().rev() {
            let (folders, files) = self.tree.children_of(folder_id).await?;

            for file in &files {
                if file.is_trashed {
                    self.purge_file(file).await?;
                    report.record(true);
                } else if skip_vanished(file.id, self.tree.files.set_folder(file.id, None).await)? {
                    report.detached += 1;
                    info!(file_id = %file.id, folder_id = %folder_id, "Detached live file from purged folder");
                }
            }
            // Trashed subfolders were purged earlier in this loop; what is
            // left is live or was attached after collection.
            for child in &folders {
                if skip_vanished(child.id, self.tree.folders.set_parent(child.id, None).await)? {
                    report.detached += 1;
                    info!(folder_id = %child.id, parent_id = %folder_id, "Detached live folder from purged folder");
                }
            }

            let deleted = self.tree.folders.delete(folder_id).await?;
            report.record(deleted);
            debug!(folder_id = %folder_id, "Purged folder");
        }

        Ok(report)
    }

    /// Upsert `entry` on `node` and on every node below it.
    ///
    /// Grants are materialised per node; content created later is not
    /// covered. Nodes owned by the target user get no entry.
    pub async fn share(&self, node: &Node, entry: &ShareEntry) -> AppResult<CascadeReport> {
        self.update_shares(node, |owner, shares| {
            owner != entry.user_id && shares.upsert(entry.clone())
        })
        .await
    }

    /// Remove `user_id`'s entry from `node` and from every node below it.
    pub async fn unshare(&self, node: &Node, user_id: UserId) -> AppResult<CascadeReport> {
        self.update_shares(node, |_, shares| shares.remove(user_id))
            .await
    }

    /// The live files and folders of `root` that `actor` may read, pre-order.
    ///
    /// Inaccessible or trashed nodes are skipped together with their
    /// subtree. Paths are made unique within the export.
    pub async fn export_entries(&self, root: &Folder, actor: UserId) -> AppResult<Vec<ExportEntry>> {
        let mut entries = Vec::new();
        let mut used = HashSet::new();
        let root_path = unique_path(&mut used, "", &root.name);
        let mut stack = vec![(root.id, root_path)];
        let mut seen = HashSet::from([root.id]);

        while let Some((folder_id, path)) = stack.pop() {
            entries.push(ExportEntry::Directory {
                path: format!("{path}/"),
            });

            let (folders, files) = self.tree.children_of(folder_id).await?;

            for file in files {
                let node = Node::File(file);
                if node.is_trashed() || !can_read(actor, &node) {
                    continue;
                }
                if let Node::File(file) = node {
                    let path = unique_path(&mut used, &path, &file.name);
                    entries.push(ExportEntry::File { path, file });
                }
            }

            let mut children = Vec::new();
            for folder in folders {
                let node = Node::Folder(folder);
                if node.is_trashed() || !can_read(actor, &node) {
                    continue;
                }
                if let Node::Folder(folder) = node {
                    if !seen.insert(folder.id) {
                        return Err(AppError::invalid_state(format!(
                            "Folder {} appears twice in one subtree",
                            folder.id
                        )));
                    }
                    children.push((folder.id, unique_path(&mut used, &path, &folder.name)));
                }
            }
            stack.extend(children.into_iter().rev());
        }

        Ok(entries)
    }

    async fn update_shares<F>(&self, node: &Node, edit: F) -> AppResult<CascadeReport>
    where
        F: Fn(UserId, &mut ShareList) -> bool,
    {
        let mut report = CascadeReport::default();

        let mut shares = node.shared_with().clone();
        let changed = edit(node.owner_id(), &mut shares);
        if changed {
            self.set_shared_with(node.id(), &shares).await?;
        }
        report.record(changed);

        let Node::Folder(root) = node else {
            return Ok(report);
        };

        let mut frontier = Frontier::new(root.id);
        while let Some(folder_id) = frontier.pop() {
            let (folders, files) = self.tree.children_of(folder_id).await?;

            for file in files {
                let mut shares = file.shared_with;
                let mut written = edit(file.owner_id, &mut shares);
                if written {
                    written = skip_vanished(
                        file.id,
                        self.tree.files.set_shared_with(file.id, &shares).await,
                    )?;
                }
                report.record(written);
            }
            for child in folders {
                let mut shares = child.shared_with;
                let changed = edit(child.owner_id, &mut shares);
                let mut present = true;
                if changed {
                    present = skip_vanished(
                        child.id,
                        self.tree.folders.set_shared_with(child.id, &shares).await,
                    )?;
                }
                report.record(changed && present);
                if present {
                    frontier.push(child.id)?;
                }
            }
        }

        debug!(node = %node.id(), applied = report.applied, "Share cascade finished");
        Ok(report)
    }

    async fn purge_file(&self, file: &File) -> AppResult<()> {
        self.blobs.delete(&file.content_handle).await?;
        self.tree.files.delete(file.id).await?;
        debug!(file_id = %file.id, handle = %file.content_handle, "Purged file");
        Ok(())
    }

    async fn set_trashed(&self, id: NodeId, trashed_at: Option<DateTime<Utc>>) -> AppResult<()> {
        match id {
            NodeId::File(id) => self.tree.files.set_trashed(id, trashed_at).await.map(drop),
            NodeId::Folder(id) => self.tree.folders.set_trashed(id, trashed_at).await.map(drop),
        }
    }

    async fn set_shared_with(&self, id: NodeId, shares: &ShareList) -> AppResult<()> {
        match id {
            NodeId::File(id) => self.tree.files.set_shared_with(id, shares).await.map(drop),
            NodeId::Folder(id) => self
                .tree
                .folders
                .set_shared_with(id, shares)
                .await
                .map(drop),
        }
    }
}

/// `Ok(true)` if a descendant write landed, `Ok(false)` if its row is gone.
fn skip_vanished<T>(id: impl Into<NodeId>, result: AppResult<T>) -> AppResult<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.kind == ErrorKind::NotFound => {
            debug!(node = %id.into(), "Skipped node deleted during cascade");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

fn can_read(actor: UserId, node: &Node) -> bool {
    decide(actor, node, &Operation::Read, &PathContext::default()).is_allowed()
}

/// Join `parent` and `name`, suffixing ` (n)` before the extension when the
/// path is already taken.
fn unique_path(used: &mut HashSet<String>, parent: &str, name: &str) -> String {
    let name = name.replace('/', "_");
    let join = |n: &str| {
        if parent.is_empty() {
            n.to_string()
        } else {
            format!("{parent}/{n}")
        }
    };

    let mut candidate = join(&name);
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name.as_str(), ""),
    };
    let mut n = 1;
    while !used.insert(candidate.clone()) {
        candidate = join(&format!("{stem} ({n}){ext}"));
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_path() {
        let mut used = HashSet::new();
        assert_eq!(unique_path(&mut used, "A", "x.txt"), "A/x.txt");
        assert_eq!(unique_path(&mut used, "A", "x.txt"), "A/x (1).txt");
        assert_eq!(unique_path(&mut used, "A", "x.txt"), "A/x (2).txt");
        assert_eq!(unique_path(&mut used, "", "A"), "A");
        assert_eq!(unique_path(&mut used, "A", ".env"), "A/.env");
        assert_eq!(unique_path(&mut used, "A", "a/b"), "A/a_b");
    }
}
