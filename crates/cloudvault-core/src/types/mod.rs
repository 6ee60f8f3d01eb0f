//! Core type definitions used across the CloudVault workspace.

pub mod id;

pub use id::*;
