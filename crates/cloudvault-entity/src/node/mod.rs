//! Uniform view over files and folders.

pub mod model;

pub use model::{Node, NodeId, NodeKind};
