//! The decision table.
//!
//! Pure: every input, including the ancestor chains, is loaded by the caller.
//!
//! Owners may do anything to their own nodes except move them into a folder
//! they do not own. Non-owners need a direct grant on the node; mutations
//! reached through a folder path additionally need an editor grant on every
//! ancestor folder up to and including the top-level one.

use std::fmt;

use serde::Serialize;

use cloudvault_core::types::{FolderId, UserId};
use cloudvault_entity::folder::Folder;
use cloudvault_entity::node::Node;

use super::operation::Operation;

/// Ancestor chains pre-fetched for path-sensitive operations.
#[derive(Debug, Clone, Default)]
pub struct PathContext {
    /// Ancestors of the node, nearest first, starting at its parent.
    pub source_chain: Vec<Folder>,
    /// The move destination followed by its ancestors, nearest first.
    pub target_chain: Vec<Folder>,
}

/// Why an operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    /// Only the owner may perform this operation.
    OwnerOnly,
    /// The actor holds no share entry on the node.
    NoAccess,
    /// The actor's share entry on the node is not an editor grant.
    NotEditor,
    /// A folder between the node and the top of the tree lacks an editor grant.
    BrokenEditorPath {
        /// The first folder without an editor grant.
        folder_id: FolderId,
    },
    /// The node has no parent and the actor does not own it.
    ParentlessSharedNode,
    /// The actor holds no editor grant on the move destination.
    DestinationNotEditable,
    /// The owner tried to move content into someone else's folder.
    DestinationNotOwned,
    /// The move would change which user owns the content's folder.
    CrossOwnerMove,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnerOnly => f.write_str("only the owner can do this"),
            Self::NoAccess => f.write_str("no access"),
            Self::NotEditor => f.write_str("editor access required"),
            Self::BrokenEditorPath { folder_id } => {
                write!(f, "editor access missing on ancestor folder {folder_id}")
            }
            Self::ParentlessSharedNode => {
                f.write_str("shared top-level items can only be changed by their owner")
            }
            Self::DestinationNotEditable => {
                f.write_str("editor access required on the destination folder")
            }
            Self::DestinationNotOwned => f.write_str("destination folder belongs to another user"),
            Self::CrossOwnerMove => f.write_str("content cannot move between owners"),
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation is rejected.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the decision allows the operation.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `actor` may perform `operation` on `node`.
pub fn decide(actor: UserId, node: &Node, operation: &Operation, path: &PathContext) -> Decision {
    if node.is_owned_by(actor) {
        return decide_owner(actor, operation);
    }

    let shares = node.shared_with();
    match operation {
        Operation::Read => {
            if shares.has_access(actor) {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NoAccess)
            }
        }
        Operation::CreateChild | Operation::Restore => require_editor(actor, node),
        Operation::PermanentDelete
        | Operation::Share
        | Operation::Unshare
        | Operation::ListShares => Decision::Deny(DenyReason::OwnerOnly),
        Operation::Rename | Operation::Trash => check_source(actor, node, path),
        Operation::Move { destination } => {
            if let Decision::Deny(reason) = check_source(actor, node, path) {
                return Decision::Deny(reason);
            }
            match destination {
                None => Decision::Allow,
                Some(dest) => {
                    if !dest.shared_with.is_editor(actor) {
                        return Decision::Deny(DenyReason::DestinationNotEditable);
                    }
                    if let Some(folder_id) = first_non_editor(actor, &path.target_chain) {
                        return Decision::Deny(DenyReason::BrokenEditorPath { folder_id });
                    }
                    if dest.owner_id != node.owner_id() {
                        return Decision::Deny(DenyReason::CrossOwnerMove);
                    }
                    Decision::Allow
                }
            }
        }
    }
}

fn decide_owner(actor: UserId, operation: &Operation) -> Decision {
    match operation.destination() {
        Some(dest) if dest.owner_id != actor => Decision::Deny(DenyReason::DestinationNotOwned),
        _ => Decision::Allow,
    }
}

fn require_editor(actor: UserId, node: &Node) -> Decision {
    match node.shared_with().permission_for(actor) {
        None => Decision::Deny(DenyReason::NoAccess),
        Some(_) if !node.shared_with().is_editor(actor) => Decision::Deny(DenyReason::NotEditor),
        Some(_) => Decision::Allow,
    }
}

fn check_source(actor: UserId, node: &Node, path: &PathContext) -> Decision {
    if node.parent_id().is_none() {
        return Decision::Deny(DenyReason::ParentlessSharedNode);
    }
    if let Decision::Deny(reason) = require_editor(actor, node) {
        return Decision::Deny(reason);
    }
    match first_non_editor(actor, &path.source_chain) {
        Some(folder_id) => Decision::Deny(DenyReason::BrokenEditorPath { folder_id }),
        None => Decision::Allow,
    }
}

fn first_non_editor(actor: UserId, chain: &[Folder]) -> Option<FolderId> {
    chain
        .iter()
        .find(|f| f.owner_id != actor && !f.shared_with.is_editor(actor))
        .map(|f| f.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cloudvault_entity::share::{ShareEntry, SharePermission, ShareList};

    fn folder(owner: UserId, parent: Option<&Folder>) -> Folder {
        let now = Utc::now();
        Folder {
            id: FolderId::new(),
            name: "f".to_string(),
            owner_id: owner,
            parent_id: parent.map(|p| p.id),
            is_trashed: false,
            trashed_at: None,
            shared_with: ShareList::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn grant(folder: &mut Folder, user: UserId, permission: SharePermission) {
        folder.shared_with.upsert(ShareEntry {
            user_id: user,
            email: "u@example.com".to_string(),
            permission,
        });
    }

    /// owner/top/mid/leaf, every level shared with `editor` as editor.
    fn shared_chain(owner: UserId, editor: UserId) -> (Folder, Folder, Folder) {
        let mut top = folder(owner, None);
        let mut mid = folder(owner, Some(&top));
        let mut leaf = folder(owner, Some(&mid));
        for f in [&mut top, &mut mid, &mut leaf] {
            grant(f, editor, SharePermission::Editor);
        }
        (top, mid, leaf)
    }

    fn path(chain: Vec<Folder>) -> PathContext {
        PathContext {
            source_chain: chain,
            target_chain: Vec::new(),
        }
    }

    #[test]
    fn test_owner_allowed_everything_in_own_tree() {
        let owner = UserId::new();
        let top = folder(owner, None);
        let node = Node::Folder(top.clone());
        for op in [
            Operation::Read,
            Operation::Rename,
            Operation::Trash,
            Operation::Restore,
            Operation::PermanentDelete,
            Operation::Share,
            Operation::Unshare,
            Operation::ListShares,
            Operation::Move { destination: None },
        ] {
            assert_eq!(decide(owner, &node, &op, &PathContext::default()), Decision::Allow);
        }
    }

    #[test]
    fn test_owner_cannot_move_into_foreign_folder() {
        let (owner, other) = (UserId::new(), UserId::new());
        let node = Node::Folder(folder(owner, None));
        let mut foreign = folder(other, None);
        grant(&mut foreign, owner, SharePermission::Editor);

        let op = Operation::Move {
            destination: Some(foreign),
        };
        assert_eq!(
            decide(owner, &node, &op, &PathContext::default()),
            Decision::Deny(DenyReason::DestinationNotOwned)
        );
    }

    #[test]
    fn test_path_editor_allows_rename_with_full_chain() {
        let (owner, editor) = (UserId::new(), UserId::new());
        let (top, mid, leaf) = shared_chain(owner, editor);
        let node = Node::Folder(leaf);

        let decision = decide(editor, &node, &Operation::Rename, &path(vec![mid, top]));
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_removing_any_single_ancestor_grant_denies() {
        let (owner, editor) = (UserId::new(), UserId::new());
        let (top, mid, leaf) = shared_chain(owner, editor);
        let node = Node::Folder(leaf);

        for broken in 0..2 {
            let mut chain = vec![mid.clone(), top.clone()];
            chain[broken].shared_with.remove(editor);
            let broken_id = chain[broken].id;

            for op in [
                Operation::Rename,
                Operation::Trash,
                Operation::Move { destination: None },
            ] {
                assert_eq!(
                    decide(editor, &node, &op, &path(chain.clone())),
                    Decision::Deny(DenyReason::BrokenEditorPath {
                        folder_id: broken_id
                    })
                );
            }
        }
    }

    #[test]
    fn test_viewer_on_ancestor_breaks_path() {
        let (owner, editor) = (UserId::new(), UserId::new());
        let (mut top, mid, leaf) = shared_chain(owner, editor);
        grant(&mut top, editor, SharePermission::Viewer);

        let decision = decide(
            editor,
            &Node::Folder(leaf),
            &Operation::Trash,
            &path(vec![mid, top.clone()]),
        );
        assert_eq!(
            decision,
            Decision::Deny(DenyReason::BrokenEditorPath { folder_id: top.id })
        );
    }

    #[test]
    fn test_direct_grant_required_on_node() {
        let (owner, editor) = (UserId::new(), UserId::new());
        let (top, mid, mut leaf) = shared_chain(owner, editor);
        grant(&mut leaf, editor, SharePermission::Viewer);
        let node = Node::Folder(leaf.clone());

        assert_eq!(
            decide(editor, &node, &Operation::Rename, &path(vec![mid, top])),
            Decision::Deny(DenyReason::NotEditor)
        );
        assert_eq!(
            decide(editor, &node, &Operation::Read, &PathContext::default()),
            Decision::Allow
        );

        leaf.shared_with.remove(editor);
        assert_eq!(
            decide(editor, &Node::Folder(leaf), &Operation::Read, &PathContext::default()),
            Decision::Deny(DenyReason::NoAccess)
        );
    }

    #[test]
    fn test_parentless_shared_node_is_immutable_for_non_owner() {
        let (owner, editor) = (UserId::new(), UserId::new());
        let (top, _, _) = shared_chain(owner, editor);
        let node = Node::Folder(top);

        for op in [
            Operation::Rename,
            Operation::Trash,
            Operation::Move { destination: None },
        ] {
            assert_eq!(
                decide(editor, &node, &op, &PathContext::default()),
                Decision::Deny(DenyReason::ParentlessSharedNode)
            );
        }
        assert_eq!(
            decide(editor, &node, &Operation::Restore, &PathContext::default()),
            Decision::Allow
        );
        assert_eq!(
            decide(editor, &node, &Operation::CreateChild, &PathContext::default()),
            Decision::Allow
        );
    }

    #[test]
    fn test_owner_only_operations() {
        let (owner, editor) = (UserId::new(), UserId::new());
        let (top, mid, leaf) = shared_chain(owner, editor);
        let node = Node::Folder(leaf);
        for op in [
            Operation::PermanentDelete,
            Operation::Share,
            Operation::Unshare,
            Operation::ListShares,
        ] {
            assert_eq!(
                decide(editor, &node, &op, &path(vec![mid.clone(), top.clone()])),
                Decision::Deny(DenyReason::OwnerOnly)
            );
        }
    }

    #[test]
    fn test_non_owner_move_between_shared_folders() {
        let (owner, editor) = (UserId::new(), UserId::new());
        let (top, mid, leaf) = shared_chain(owner, editor);
        let mut other = folder(owner, Some(&top));
        grant(&mut other, editor, SharePermission::Editor);

        let op = Operation::Move {
            destination: Some(other.clone()),
        };
        let ctx = PathContext {
            source_chain: vec![mid.clone(), top.clone()],
            target_chain: vec![other.clone(), top.clone()],
        };
        assert_eq!(decide(editor, &Node::Folder(leaf.clone()), &op, &ctx), Decision::Allow);

        other.shared_with.remove(editor);
        let op = Operation::Move {
            destination: Some(other),
        };
        assert_eq!(
            decide(editor, &Node::Folder(leaf), &op, &ctx),
            Decision::Deny(DenyReason::DestinationNotEditable)
        );
    }

    #[test]
    fn test_cross_owner_move_denied_even_with_editor_everywhere() {
        let (owner, third, editor) = (UserId::new(), UserId::new(), UserId::new());
        let (top, mid, leaf) = shared_chain(owner, editor);
        let mut foreign = folder(third, None);
        grant(&mut foreign, editor, SharePermission::Editor);

        let op = Operation::Move {
            destination: Some(foreign.clone()),
        };
        let ctx = PathContext {
            source_chain: vec![mid, top],
            target_chain: vec![foreign],
        };
        assert_eq!(
            decide(editor, &Node::Folder(leaf), &op, &ctx),
            Decision::Deny(DenyReason::CrossOwnerMove)
        );
    }

    #[test]
    fn test_actor_owned_ancestors_satisfy_path() {
        let (owner, editor) = (UserId::new(), UserId::new());
        let top = folder(editor, None);
        let mut mid = folder(owner, Some(&top));
        grant(&mut mid, editor, SharePermission::Editor);
        let mut leaf = folder(owner, Some(&mid));
        grant(&mut leaf, editor, SharePermission::Editor);

        assert_eq!(
            decide(editor, &Node::Folder(leaf), &Operation::Rename, &path(vec![mid, top])),
            Decision::Allow
        );
    }
}
