//! Selects the blob store provider from configuration.

use std::sync::Arc;

use tracing::info;

use cloudvault_core::config::StorageConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::BlobStore;

use crate::providers::{LocalBlobStore, MemoryBlobStore};

/// Build the configured blob store.
pub async fn build_blob_store(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.provider.as_str() {
        "local" => Arc::new(LocalBlobStore::new(&config.local.root_path).await?),
        "memory" => Arc::new(MemoryBlobStore::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown storage provider '{other}'. Expected local or memory"
            )));
        }
    };

    info!(provider = store.provider_type(), "Blob store initialized");
    Ok(store)
}
