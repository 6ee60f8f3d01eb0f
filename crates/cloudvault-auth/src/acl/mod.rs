//! Access control: one decision primitive for every mutation.

pub mod operation;
pub mod policy;
pub mod resolver;
pub mod walker;

pub use operation::Operation;
pub use policy::{Decision, DenyReason, PathContext, decide};
pub use resolver::AccessResolver;
pub use walker::AncestorWalker;
