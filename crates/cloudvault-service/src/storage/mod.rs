//! Quota accounting and storage statistics.

pub mod service;

pub use service::StorageService;
