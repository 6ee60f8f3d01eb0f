//! Blob store trait for pluggable file content backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Opaque content store keyed by handle.
///
/// Handles are minted by the store on `put` and are never reused, so
/// deleting one file's content can never affect another file.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store `data` and return the handle that addresses it.
    async fn put(&self, data: Bytes, content_type: &str) -> AppResult<String>;

    /// Open the content behind `handle` as a byte stream.
    async fn open_read(&self, handle: &str) -> AppResult<ByteStream>;

    /// Read the content behind `handle` fully into memory.
    async fn read_bytes(&self, handle: &str) -> AppResult<Bytes>;

    /// Remove the content behind `handle`. Unknown handles are not an error.
    async fn delete(&self, handle: &str) -> AppResult<()>;

    /// Check whether `handle` currently resolves to content.
    async fn exists(&self, handle: &str) -> AppResult<bool>;
}
