//! In-memory file store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{FileId, FolderId, UserId};
use cloudvault_entity::file::{CreateFile, File};
use cloudvault_entity::share::ShareList;

use crate::store::FileStore;

/// File rows held in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    rows: Arc<DashMap<FileId, File>>,
}

impl MemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row verbatim.
    pub fn insert(&self, file: File) {
        self.rows.insert(file.id, file);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn select(&self, pred: impl Fn(&File) -> bool) -> Vec<File> {
        let mut rows: Vec<File> = self
            .rows
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    fn update(&self, id: FileId, apply: impl FnOnce(&mut File)) -> AppResult<File> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;
        apply(row.value_mut());
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        Ok(self.rows.get(&id).map(|r| r.value().clone()))
    }

    async fn find_in_folder(&self, folder_id: FolderId) -> AppResult<Vec<File>> {
        Ok(self.select(|f| f.folder_id == Some(folder_id)))
    }

    async fn find_roots(&self, owner_id: UserId) -> AppResult<Vec<File>> {
        Ok(self.select(|f| f.owner_id == owner_id && f.folder_id.is_none() && !f.is_trashed))
    }

    async fn find_by_owner(&self, owner_id: UserId, trashed: Option<bool>) -> AppResult<Vec<File>> {
        let mut rows =
            self.select(|f| f.owner_id == owner_id && trashed.is_none_or(|t| f.is_trashed == t));
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn find_by_name(
        &self,
        owner_id: UserId,
        folder_id: Option<FolderId>,
        name: &str,
    ) -> AppResult<Option<File>> {
        Ok(self
            .select(|f| {
                f.owner_id == owner_id && f.folder_id == folder_id && f.name == name && !f.is_trashed
            })
            .into_iter()
            .next())
    }

    async fn find_shared_with(&self, user_id: UserId) -> AppResult<Vec<File>> {
        Ok(self.select(|f| !f.is_trashed && f.shared_with.has_access(user_id)))
    }

    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<File>> {
        let mut rows = self.select(|f| f.is_trashed && f.trashed_at.is_some_and(|t| t <= cutoff));
        rows.sort_by_key(|f| f.trashed_at);
        Ok(rows)
    }

    async fn sum_active_size(&self, owner_id: UserId) -> AppResult<i64> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.owner_id == owner_id && !r.is_trashed)
            .map(|r| r.size_bytes)
            .sum())
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        let file = File {
            id: FileId::new(),
            name: data.name.clone(),
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            content_handle: data.content_handle.clone(),
            size_bytes: data.size_bytes,
            content_type: data.content_type.clone(),
            is_trashed: false,
            trashed_at: None,
            shared_with: data.shared_with.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(file.id, file.clone());
        Ok(file)
    }

    async fn rename(&self, id: FileId, name: &str) -> AppResult<File> {
        self.update(id, |f| f.name = name.to_string())
    }

    async fn set_folder(&self, id: FileId, folder_id: Option<FolderId>) -> AppResult<File> {
        self.update(id, |f| f.folder_id = folder_id)
    }

    async fn set_trashed(&self, id: FileId, trashed_at: Option<DateTime<Utc>>) -> AppResult<File> {
        self.update(id, |f| match trashed_at {
            Some(at) => f.mark_trashed(at),
            None => f.mark_restored(),
        })
    }

    async fn set_shared_with(&self, id: FileId, shared_with: &ShareList) -> AppResult<File> {
        self.update(id, |f| f.shared_with = shared_with.clone())
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        Ok(self.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_file(owner_id: UserId, folder_id: Option<FolderId>, name: &str, size: i64) -> CreateFile {
        CreateFile {
            name: name.to_string(),
            owner_id,
            folder_id,
            content_handle: format!("blob-{name}"),
            size_bytes: size,
            content_type: "text/plain".to_string(),
            shared_with: ShareList::new(),
        }
    }

    #[tokio::test]
    async fn test_sum_active_size_excludes_trash() {
        let store = MemoryFileStore::new();
        let owner = UserId::new();
        store.create(&new_file(owner, None, "a.txt", 10)).await.unwrap();
        let b = store.create(&new_file(owner, None, "b.txt", 20)).await.unwrap();
        store
            .create(&new_file(UserId::new(), None, "c.txt", 40))
            .await
            .unwrap();

        assert_eq!(store.sum_active_size(owner).await.unwrap(), 30);
        store.set_trashed(b.id, Some(Utc::now())).await.unwrap();
        assert_eq!(store.sum_active_size(owner).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_find_trashed_before_is_inclusive() {
        let store = MemoryFileStore::new();
        let owner = UserId::new();
        let now = Utc::now();
        let f = store.create(&new_file(owner, None, "a.txt", 1)).await.unwrap();
        store.set_trashed(f.id, Some(now)).await.unwrap();

        assert_eq!(store.find_trashed_before(now).await.unwrap().len(), 1);
        assert!(
            store
                .find_trashed_before(now - Duration::seconds(1))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_find_by_name_skips_trashed() {
        let store = MemoryFileStore::new();
        let owner = UserId::new();
        let folder = Some(FolderId::new());
        let f = store.create(&new_file(owner, folder, "a.txt", 1)).await.unwrap();
        assert!(store.find_by_name(owner, folder, "a.txt").await.unwrap().is_some());

        store.set_trashed(f.id, Some(Utc::now())).await.unwrap();
        assert!(store.find_by_name(owner, folder, "a.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let store = MemoryFileStore::new();
        let err = store.rename(FileId::new(), "x").await.unwrap_err();
        assert_eq!(err.kind, cloudvault_core::ErrorKind::NotFound);
    }
}
