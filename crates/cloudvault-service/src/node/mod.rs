//! Rename and move, plus node lookups shared by the other services.

pub mod lookup;
pub mod service;

pub use service::NodeService;
