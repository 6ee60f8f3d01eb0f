//! Subtree operations.

pub mod engine;

pub use engine::{CascadeEngine, CascadeReport, ExportEntry};
