//! Materialized share entries stored on every node they apply to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use cloudvault_core::AppError;
use cloudvault_core::types::UserId;

/// Permission carried by a share entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    /// May read and download.
    Viewer,
    /// May additionally mutate, subject to the path rules.
    Editor,
}

impl SharePermission {
    /// Return the permission as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
        }
    }
}

impl fmt::Display for SharePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharePermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "editor" => Ok(Self::Editor),
            _ => Err(AppError::validation(format!(
                "Invalid share permission: '{s}'. Expected viewer or editor"
            ))),
        }
    }
}

/// One user's grant on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    /// The user receiving the grant.
    pub user_id: UserId,
    /// The user's email at the time of sharing.
    pub email: String,
    /// Granted permission.
    pub permission: SharePermission,
}

/// Ordered set of share entries, unique per user.
///
/// Stored as a JSON array column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareList(Vec<ShareEntry>);

impl ShareList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert `entry`, or update the permission of the existing entry for
    /// the same user in place. Returns `true` if the list changed.
    pub fn upsert(&mut self, entry: ShareEntry) -> bool {
        match self.0.iter_mut().find(|e| e.user_id == entry.user_id) {
            Some(existing) => {
                if existing.permission == entry.permission && existing.email == entry.email {
                    return false;
                }
                existing.permission = entry.permission;
                existing.email = entry.email;
                true
            }
            None => {
                self.0.push(entry);
                true
            }
        }
    }

    /// Remove the entry for `user_id`. Returns `true` if one was removed.
    pub fn remove(&mut self, user_id: UserId) -> bool {
        let before = self.0.len();
        self.0.retain(|e| e.user_id != user_id);
        self.0.len() != before
    }

    /// Permission held by `user_id`, if any.
    pub fn permission_for(&self, user_id: UserId) -> Option<SharePermission> {
        self.0
            .iter()
            .find(|e| e.user_id == user_id)
            .map(|e| e.permission)
    }

    /// Whether `user_id` holds an editor grant.
    pub fn is_editor(&self, user_id: UserId) -> bool {
        self.permission_for(user_id) == Some(SharePermission::Editor)
    }

    /// Whether `user_id` holds any grant.
    pub fn has_access(&self, user_id: UserId) -> bool {
        self.permission_for(user_id).is_some()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ShareEntry> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the list into its entries.
    pub fn into_inner(self) -> Vec<ShareEntry> {
        self.0
    }
}

impl From<Vec<ShareEntry>> for ShareList {
    fn from(entries: Vec<ShareEntry>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            list.upsert(entry);
        }
        list
    }
}
