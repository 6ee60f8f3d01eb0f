//! Local filesystem blob store.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::storage::{BlobStore, ByteStream};

/// Stores each blob as one file under a two-level fan-out directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all blobs.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at the given path, creating it if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Map a handle to its path. Anything that is not a UUID resolves to
    /// nothing, so a handle can never escape the root.
    fn resolve(&self, handle: &str) -> Option<PathBuf> {
        let id = Uuid::parse_str(handle).ok()?.simple().to_string();
        Some(self.root.join(&id[0..2]).join(&id[2..4]).join(id))
    }
}

fn not_found(handle: &str) -> AppError {
    AppError::new(ErrorKind::Storage, format!("Blob not found: {handle}"))
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, data: Bytes, content_type: &str) -> AppResult<String> {
        let handle = Uuid::new_v4().to_string();
        let path = self
            .resolve(&handle)
            .ok_or_else(|| AppError::internal("Generated an unresolvable blob handle"))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create blob directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        fs::write(&path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write blob {handle}"), e)
        })?;

        debug!(handle = %handle, content_type, bytes = data.len(), "Stored blob");
        Ok(handle)
    }

    async fn open_read(&self, handle: &str) -> AppResult<ByteStream> {
        let path = self.resolve(handle).ok_or_else(|| not_found(handle))?;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                not_found(handle)
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to open blob {handle}"), e)
            }
        })?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn read_bytes(&self, handle: &str) -> AppResult<Bytes> {
        let path = self.resolve(handle).ok_or_else(|| not_found(handle))?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                not_found(handle)
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to read blob {handle}"), e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, handle: &str) -> AppResult<()> {
        let Some(path) = self.resolve(handle) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(handle, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob {handle}"),
                e,
            )),
        }
    }

    async fn exists(&self, handle: &str) -> AppResult<bool> {
        match self.resolve(handle) {
            Some(path) => Ok(fs::try_exists(&path).await.unwrap_or(false)),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let data = Bytes::from("hello world");
        let handle = store.put(data.clone(), "text/plain").await.unwrap();
        assert!(store.exists(&handle).await.unwrap());
        assert_eq!(store.read_bytes(&handle).await.unwrap(), data);

        let mut stream = store.open_read(&handle).await.unwrap();
        let mut streamed = Vec::new();
        while let Some(chunk) = stream.next().await {
            streamed.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(streamed, data.to_vec());

        store.delete(&handle).await.unwrap();
        assert!(!store.exists(&handle).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let handle = store.put(Bytes::from("x"), "text/plain").await.unwrap();
        store.delete(&handle).await.unwrap();
        store.delete(&handle).await.unwrap();
        store.delete(&Uuid::new_v4().to_string()).await.unwrap();
        store.delete("../../etc/passwd").await.unwrap();
    }

    #[tokio::test]
    async fn test_equal_content_gets_distinct_handles() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let a = store.put(Bytes::from("same"), "text/plain").await.unwrap();
        let b = store.put(Bytes::from("same"), "text/plain").await.unwrap();
        assert_ne!(a, b);

        store.delete(&a).await.unwrap();
        assert_eq!(store.read_bytes(&b).await.unwrap(), Bytes::from("same"));
    }

    #[tokio::test]
    async fn test_unknown_handle_read_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let err = store.read_bytes("not-a-handle").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }
}
