//! Root-ward ancestor walk with a per-call folder cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::FolderId;
use cloudvault_database::store::FolderStore;
use cloudvault_entity::folder::Folder;

/// Walks parent links one hop at a time.
///
/// Folder lookups are memoised for the lifetime of the walker, so several
/// chains resolved for one operation share their lookups. Create one walker
/// per operation; the cache never outlives it.
#[derive(Debug)]
pub struct AncestorWalker {
    folders: Arc<dyn FolderStore>,
    cache: HashMap<FolderId, Option<Folder>>,
}

impl AncestorWalker {
    /// Create a walker with an empty cache.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self {
            folders,
            cache: HashMap::new(),
        }
    }

    /// Load one folder, trashed or not.
    pub async fn folder(&mut self, id: FolderId) -> AppResult<Option<Folder>> {
        if let Some(hit) = self.cache.get(&id) {
            return Ok(hit.clone());
        }
        let folder = self.folders.find_by_id(id).await?;
        self.cache.insert(id, folder.clone());
        Ok(folder)
    }

    /// The folder `start` and all of its ancestors, nearest first.
    ///
    /// Stops at the first folder without a parent or at a dangling parent
    /// reference. A folder seen twice means the stored tree has a cycle.
    pub async fn chain_from(&mut self, start: Option<FolderId>) -> AppResult<Vec<Folder>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = start;

        while let Some(id) = next {
            if !seen.insert(id) {
                return Err(AppError::invalid_state(format!(
                    "Folder {id} is its own ancestor"
                )));
            }
            let Some(folder) = self.folder(id).await? else {
                break;
            };
            next = folder.parent_id;
            chain.push(folder);
        }

        Ok(chain)
    }

    /// Whether `ancestor` is `folder` itself or lies above it.
    pub async fn is_within(&mut self, folder: FolderId, ancestor: FolderId) -> AppResult<bool> {
        Ok(self
            .chain_from(Some(folder))
            .await?
            .iter()
            .any(|f| f.id == ancestor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cloudvault_core::types::UserId;
    use cloudvault_database::memory::MemoryFolderStore;
    use cloudvault_entity::share::ShareList;

    fn folder(owner: UserId, parent: Option<FolderId>) -> Folder {
        let now = Utc::now();
        Folder {
            id: FolderId::new(),
            name: "f".to_string(),
            owner_id: owner,
            parent_id: parent,
            is_trashed: false,
            trashed_at: None,
            shared_with: ShareList::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_chain_is_nearest_first() {
        let store = MemoryFolderStore::new();
        let owner = UserId::new();
        let top = folder(owner, None);
        let mid = folder(owner, Some(top.id));
        let leaf = folder(owner, Some(mid.id));
        for f in [&top, &mid, &leaf] {
            store.insert(f.clone());
        }

        let mut walker = AncestorWalker::new(Arc::new(store));
        let ids: Vec<FolderId> = walker
            .chain_from(Some(leaf.id))
            .await
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![leaf.id, mid.id, top.id]);
        assert!(walker.is_within(leaf.id, top.id).await.unwrap());
        assert!(!walker.is_within(top.id, leaf.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_dangling_parent_ends_walk() {
        let store = MemoryFolderStore::new();
        let orphan = folder(UserId::new(), Some(FolderId::new()));
        store.insert(orphan.clone());

        let mut walker = AncestorWalker::new(Arc::new(store));
        let chain = walker.chain_from(Some(orphan.id)).await.unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[tokio::test]
    async fn test_stored_cycle_is_invalid_state() {
        let store = MemoryFolderStore::new();
        let owner = UserId::new();
        let mut a = folder(owner, None);
        let b = folder(owner, Some(a.id));
        a.parent_id = Some(b.id);
        store.insert(a.clone());
        store.insert(b);

        let mut walker = AncestorWalker::new(Arc::new(store));
        let err = walker.chain_from(Some(a.id)).await.unwrap_err();
        assert_eq!(err.kind, cloudvault_core::ErrorKind::InvalidState);
    }
}
