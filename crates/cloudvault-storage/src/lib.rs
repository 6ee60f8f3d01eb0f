//! # cloudvault-storage
//!
//! Blob store implementations for file content. Handles are random UUIDs
//! minted on `put`; the stores never interpret content.

pub mod manager;
pub mod providers;

pub use manager::build_blob_store;
pub use providers::{LocalBlobStore, MemoryBlobStore};
