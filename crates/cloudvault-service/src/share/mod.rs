//! Sharing by email with materialised per-node grants.

pub mod service;

pub use service::{ShareService, SharedListing};
