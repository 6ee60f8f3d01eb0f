//! # cloudvault-core
//!
//! Core crate for CloudVault. Contains the unified error system, typed
//! identifiers, configuration schemas, and the collaborator traits the
//! access-control and lifecycle engine consumes.
//!
//! This crate has **no** internal dependencies on other CloudVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
