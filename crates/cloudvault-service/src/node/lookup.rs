//! Loading nodes with the error kinds the operations report.

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::FolderId;
use cloudvault_database::store::TreeStore;
use cloudvault_entity::folder::Folder;
use cloudvault_entity::node::{Node, NodeId};

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Load a node in any lifecycle state.
pub async fn load_node(tree: &TreeStore, id: NodeId) -> AppResult<Node> {
    tree.find_node(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} {} not found", id.kind(), node_uuid(id))))
}

/// Load a node that is not in the trash.
pub async fn load_live_node(tree: &TreeStore, id: NodeId) -> AppResult<Node> {
    let node = load_node(tree, id).await?;
    if node.is_trashed() {
        return Err(AppError::not_found(format!(
            "{} '{}' is in the trash",
            node.kind(),
            node.name()
        )));
    }
    Ok(node)
}

/// Load the folder content is being placed into.
///
/// A missing or trashed target is a structural error, not a lookup miss.
pub async fn load_target_folder(tree: &TreeStore, id: FolderId) -> AppResult<Folder> {
    match tree.folders.find_by_id(id).await? {
        Some(folder) if folder.is_trashed => Err(AppError::invalid_state(format!(
            "Target folder '{}' is in the trash",
            folder.name
        ))),
        Some(folder) => Ok(folder),
        None => Err(AppError::invalid_state(format!(
            "Target folder {id} does not exist"
        ))),
    }
}

/// Trim and check a user-supplied display name.
pub fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    if name.contains('/') || name == "." || name == ".." {
        return Err(AppError::validation(format!("Invalid name '{name}'")));
    }
    Ok(name.to_string())
}

fn node_uuid(id: NodeId) -> String {
    match id {
        NodeId::File(id) => id.to_string(),
        NodeId::Folder(id) => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  report.pdf ").unwrap(), "report.pdf");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }
}
