//! Operation kinds evaluated by the access resolver.

use std::fmt;

use cloudvault_entity::folder::Folder;

/// What the actor wants to do with a node.
#[derive(Debug, Clone)]
pub enum Operation {
    /// View metadata, download, export.
    Read,
    /// Change the display name.
    Rename,
    /// Soft-delete the node and its subtree.
    Trash,
    /// Bring a trashed node back.
    Restore,
    /// Destroy the node, its subtree and blob content.
    PermanentDelete,
    /// Re-parent the node. `None` moves it to root.
    Move {
        /// The loaded destination folder.
        destination: Option<Folder>,
    },
    /// Create a folder or upload a file inside the node.
    CreateChild,
    /// Add or update a share entry.
    Share,
    /// Remove a share entry.
    Unshare,
    /// List the node's share entries.
    ListShares,
}

impl Operation {
    /// Whether non-owners need the editor chain above the node.
    pub fn walks_source_path(&self) -> bool {
        matches!(self, Self::Rename | Self::Trash | Self::Move { .. })
    }

    /// The destination folder of a move into a folder.
    pub fn destination(&self) -> Option<&Folder> {
        match self {
            Self::Move { destination } => destination.as_ref(),
            _ => None,
        }
    }

    /// Short verb used in log fields and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Rename => "rename",
            Self::Trash => "trash",
            Self::Restore => "restore",
            Self::PermanentDelete => "permanently delete",
            Self::Move { .. } => "move",
            Self::CreateChild => "add content to",
            Self::Share => "share",
            Self::Unshare => "unshare",
            Self::ListShares => "list shares of",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
