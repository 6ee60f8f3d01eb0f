//! In-memory folder store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{FolderId, UserId};
use cloudvault_entity::folder::{CreateFolder, Folder};
use cloudvault_entity::share::ShareList;

use crate::store::FolderStore;

/// Folder rows held in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryFolderStore {
    rows: Arc<DashMap<FolderId, Folder>>,
}

impl MemoryFolderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row verbatim.
    pub fn insert(&self, folder: Folder) {
        self.rows.insert(folder.id, folder);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn select(&self, pred: impl Fn(&Folder) -> bool) -> Vec<Folder> {
        let mut rows: Vec<Folder> = self
            .rows
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    fn update(&self, id: FolderId, apply: impl FnOnce(&mut Folder)) -> AppResult<Folder> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        apply(row.value_mut());
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl FolderStore for MemoryFolderStore {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.rows.get(&id).map(|r| r.value().clone()))
    }

    async fn find_children(&self, parent_id: FolderId) -> AppResult<Vec<Folder>> {
        Ok(self.select(|f| f.parent_id == Some(parent_id)))
    }

    async fn find_roots(&self, owner_id: UserId) -> AppResult<Vec<Folder>> {
        Ok(self.select(|f| f.owner_id == owner_id && f.parent_id.is_none() && !f.is_trashed))
    }

    async fn find_by_owner(
        &self,
        owner_id: UserId,
        trashed: Option<bool>,
    ) -> AppResult<Vec<Folder>> {
        let mut rows =
            self.select(|f| f.owner_id == owner_id && trashed.is_none_or(|t| f.is_trashed == t));
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn find_shared_with(&self, user_id: UserId) -> AppResult<Vec<Folder>> {
        Ok(self.select(|f| !f.is_trashed && f.shared_with.has_access(user_id)))
    }

    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Folder>> {
        let mut rows = self.select(|f| f.is_trashed && f.trashed_at.is_some_and(|t| t <= cutoff));
        rows.sort_by_key(|f| f.trashed_at);
        Ok(rows)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        let folder = Folder {
            id: FolderId::new(),
            name: data.name.clone(),
            owner_id: data.owner_id,
            parent_id: data.parent_id,
            is_trashed: false,
            trashed_at: None,
            shared_with: data.shared_with.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        self.update(id, |f| f.name = name.to_string())
    }

    async fn set_parent(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder> {
        self.update(id, |f| f.parent_id = parent_id)
    }

    async fn set_trashed(
        &self,
        id: FolderId,
        trashed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Folder> {
        self.update(id, |f| match trashed_at {
            Some(at) => f.mark_trashed(at),
            None => f.mark_restored(),
        })
    }

    async fn set_shared_with(&self, id: FolderId, shared_with: &ShareList) -> AppResult<Folder> {
        self.update(id, |f| f.shared_with = shared_with.clone())
    }

    async fn delete(&self, id: FolderId) -> AppResult<bool> {
        Ok(self.rows.remove(&id).is_some())
    }
}
