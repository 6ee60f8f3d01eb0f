//! Folder creation and listing.

pub mod service;

pub use service::{FolderListing, FolderService};
