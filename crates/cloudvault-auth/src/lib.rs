//! # cloudvault-auth
//!
//! Authorization for the node tree.
//!
//! ## Modules
//!
//! - `acl`: operation kinds, the pure decision table, the ancestor walker,
//!   and the [`AccessResolver`] that combines them

pub mod acl;

pub use acl::{AccessResolver, AncestorWalker, Decision, DenyReason, Operation, PathContext, decide};
