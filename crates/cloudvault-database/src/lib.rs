//! # cloudvault-database
//!
//! The tree node store. Store traits live in [`store`]; PostgreSQL
//! implementations in [`repositories`]; `dashmap`-backed implementations in
//! [`memory`] for tests and the `memory` profile. [`TreeStore`] bundles the
//! file and folder stores behind one handle.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{FileStore, FolderStore, TreeStore, UserDirectory};
