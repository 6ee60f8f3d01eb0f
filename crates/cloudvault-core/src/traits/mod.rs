//! Collaborator traits defined in `cloudvault-core` and implemented by other crates.

pub mod storage;

pub use storage::{BlobStore, ByteStream};
