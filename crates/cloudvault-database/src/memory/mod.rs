//! In-memory stores backed by `dashmap`.
//!
//! Each mutation locks a single row, mirroring the field-level overwrite
//! semantics of the PostgreSQL stores.

pub mod file;
pub mod folder;
pub mod user;

pub use file::MemoryFileStore;
pub use folder::MemoryFolderStore;
pub use user::MemoryUserDirectory;
