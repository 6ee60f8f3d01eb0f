//! # cloudvault-entity
//!
//! Domain entity models for CloudVault. Files and folders are table rows
//! (`sqlx::FromRow`); share lists, quota reports and statistics are value
//! objects. Nodes are always addressed by id, never by live reference.

pub mod file;
pub mod folder;
pub mod node;
pub mod share;
pub mod storage;
pub mod user;
