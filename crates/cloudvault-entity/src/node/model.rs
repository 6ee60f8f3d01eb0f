//! A node is either a file or a folder, addressed by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use cloudvault_core::types::{FileId, FolderId, UserId};

use crate::file::File;
use crate::folder::Folder;
use crate::share::ShareList;

/// Which variant a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A file.
    File,
    /// A folder.
    Folder,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Folder => f.write_str("folder"),
        }
    }
}

/// Typed identifier of either node variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum NodeId {
    /// A file id.
    File(FileId),
    /// A folder id.
    Folder(FolderId),
}

impl NodeId {
    /// The variant this id addresses.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File(_) => NodeKind::File,
            Self::Folder(_) => NodeKind::Folder,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(id) => write!(f, "file:{id}"),
            Self::Folder(id) => write!(f, "folder:{id}"),
        }
    }
}

impl From<FileId> for NodeId {
    fn from(id: FileId) -> Self {
        Self::File(id)
    }
}

impl From<FolderId> for NodeId {
    fn from(id: FolderId) -> Self {
        Self::Folder(id)
    }
}

/// A loaded file or folder row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// A file row.
    File(File),
    /// A folder row.
    Folder(Folder),
}

impl Node {
    /// The node's id.
    pub fn id(&self) -> NodeId {
        match self {
            Self::File(f) => NodeId::File(f.id),
            Self::Folder(f) => NodeId::Folder(f.id),
        }
    }

    /// The node's variant.
    pub fn kind(&self) -> NodeKind {
        self.id().kind()
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => &f.name,
            Self::Folder(f) => &f.name,
        }
    }

    /// Owning user.
    pub fn owner_id(&self) -> UserId {
        match self {
            Self::File(f) => f.owner_id,
            Self::Folder(f) => f.owner_id,
        }
    }

    /// Containing folder: a file's folder or a folder's parent.
    pub fn parent_id(&self) -> Option<FolderId> {
        match self {
            Self::File(f) => f.folder_id,
            Self::Folder(f) => f.parent_id,
        }
    }

    /// Direct share entries.
    pub fn shared_with(&self) -> &ShareList {
        match self {
            Self::File(f) => &f.shared_with,
            Self::Folder(f) => &f.shared_with,
        }
    }

    /// Soft-delete flag.
    pub fn is_trashed(&self) -> bool {
        match self {
            Self::File(f) => f.is_trashed,
            Self::Folder(f) => f.is_trashed,
        }
    }

    /// When the node was trashed.
    pub fn trashed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::File(f) => f.trashed_at,
            Self::Folder(f) => f.trashed_at,
        }
    }

    /// Whether `user_id` owns the node.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id() == user_id
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Folder> for Node {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}
