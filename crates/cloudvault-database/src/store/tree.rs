//! Combined handle over the file and folder stores.

use std::sync::Arc;

use sqlx::PgPool;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::FolderId;
use cloudvault_entity::file::File;
use cloudvault_entity::folder::Folder;
use cloudvault_entity::node::{Node, NodeId};

use super::{FileStore, FolderStore};
use crate::memory::{MemoryFileStore, MemoryFolderStore};
use crate::repositories::{FileRepository, FolderRepository};

/// The tree node store: both entity collections behind one handle.
#[derive(Debug, Clone)]
pub struct TreeStore {
    /// Folder rows.
    pub folders: Arc<dyn FolderStore>,
    /// File rows.
    pub files: Arc<dyn FileStore>,
}

impl TreeStore {
    /// Bundle existing stores.
    pub fn new(folders: Arc<dyn FolderStore>, files: Arc<dyn FileStore>) -> Self {
        Self { folders, files }
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(FolderRepository::new(pool.clone())),
            Arc::new(FileRepository::new(pool)),
        )
    }

    /// Empty in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryFolderStore::new()),
            Arc::new(MemoryFileStore::new()),
        )
    }

    /// Load a node of either variant.
    pub async fn find_node(&self, id: NodeId) -> AppResult<Option<Node>> {
        Ok(match id {
            NodeId::File(id) => self.files.find_by_id(id).await?.map(Node::File),
            NodeId::Folder(id) => self.folders.find_by_id(id).await?.map(Node::Folder),
        })
    }

    /// Current direct children of a folder, re-read from the store.
    pub async fn children_of(&self, folder_id: FolderId) -> AppResult<(Vec<Folder>, Vec<File>)> {
        let folders = self.folders.find_children(folder_id).await?;
        let files = self.files.find_in_folder(folder_id).await?;
        Ok((folders, files))
    }
}
