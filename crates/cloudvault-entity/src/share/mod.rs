//! Per-node share entries.

pub mod model;

pub use model::{ShareEntry, ShareList, SharePermission};
