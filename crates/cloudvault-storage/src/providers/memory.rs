//! In-memory blob store for tests and the `memory` profile.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::storage::{BlobStore, ByteStream};

/// Blobs held in a concurrent map.
///
/// Individual handles can be marked as failing on delete to exercise
/// partial-cascade behaviour.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, Bytes>>,
    failing_deletes: Arc<DashSet<String>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Make `delete(handle)` fail until [`Self::heal`] is called.
    pub fn fail_deletes_for(&self, handle: &str) {
        self.failing_deletes.insert(handle.to_string());
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        self.failing_deletes.clear();
    }

    fn get(&self, handle: &str) -> AppResult<Bytes> {
        self.blobs
            .get(handle)
            .map(|b| b.value().clone())
            .ok_or_else(|| AppError::storage(format!("Blob not found: {handle}")))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, data: Bytes, _content_type: &str) -> AppResult<String> {
        let handle = Uuid::new_v4().to_string();
        self.blobs.insert(handle.clone(), data);
        Ok(handle)
    }

    async fn open_read(&self, handle: &str) -> AppResult<ByteStream> {
        let data = self.get(handle)?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn read_bytes(&self, handle: &str) -> AppResult<Bytes> {
        self.get(handle)
    }

    async fn delete(&self, handle: &str) -> AppResult<()> {
        if self.failing_deletes.contains(handle) {
            return Err(AppError::storage(format!("Injected delete failure for {handle}")));
        }
        self.blobs.remove(handle);
        Ok(())
    }

    async fn exists(&self, handle: &str) -> AppResult<bool> {
        Ok(self.blobs.contains_key(handle))
    }
}
