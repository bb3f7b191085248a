//! Delete engine: removes a node and prunes ancestors left empty.

use crate::path;
use crate::repository::{NodeRepository, Result, TreeError};
use tracing::debug;

/// Remove the node at `path` and detach it from its parent.
///
/// If that leaves the parent without items, the parent is removed the same way,
/// repeating up the chain until a non-empty directory or `origin` is reached.
/// The origin itself is never pruned. A parent that no longer references the
/// removed id is fine; the node itself must exist.
///
/// Returns the removed ids in removal order: `path` first, then each pruned
/// ancestor. Descendants of a removed directory are left to the caller.
pub fn delete_node(repository: &mut NodeRepository, path: &str, origin: &str) -> Result<Vec<String>> {
    check_delete(repository, path, origin)?;

    let mut removed = Vec::new();
    let mut current = path.to_string();
    loop {
        let parent = path::parent_id(&current).to_string();
        repository.remove(&current);

        let dir = repository.directory_mut(&parent)?;
        if let Some(index) = dir.position_of(&current) {
            dir.items.remove(index);
        }
        let emptied = dir.items.is_empty();
        removed.push(current);

        if !emptied || parent == origin {
            break;
        }
        debug!("Pruning empty directory: {}", parent);
        current = parent;
    }

    debug!("Deleted {} ({} node(s) removed)", path, removed.len());
    Ok(removed)
}

/// Walk the same chain `delete_node` will, without mutating anything.
fn check_delete(repository: &NodeRepository, path: &str, origin: &str) -> Result<()> {
    if path == origin {
        return Err(TreeError::OriginRemoval(path.to_string()));
    }
    if !repository.contains(path) {
        return Err(TreeError::MissingNode(path.to_string()));
    }

    let mut current = path;
    loop {
        // The top of the vault has no parent to detach from
        if current.is_empty() {
            return Err(TreeError::OriginRemoval(current.to_string()));
        }
        let parent = path::parent_id(current);
        let dir = repository.directory(parent)?;
        let remaining = dir.items.len() - usize::from(dir.position_of(current).is_some());
        if remaining > 0 || parent == origin {
            return Ok(());
        }
        current = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DirNode, FileNode, ItemRef};

    fn dir(id: &str, items: &[&str]) -> DirNode {
        let mut dir = DirNode::new(id, path::name(id));
        dir.items = items.iter().map(|item| ItemRef::new(*item)).collect();
        dir
    }

    fn ids(repository: &NodeRepository, id: &str) -> Vec<String> {
        repository
            .directory(id)
            .unwrap()
            .items
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    #[test]
    fn test_delete_prunes_up_to_origin() {
        let mut repo = NodeRepository::new();
        repo.insert(dir("", &["A"]).into());
        repo.insert(dir("A", &["A/b.md"]).into());
        repo.insert(FileNode::new("A/b.md", "b.md").into());

        let removed = delete_node(&mut repo, "A/b.md", "").unwrap();

        assert_eq!(removed, vec!["A/b.md", "A"]);
        assert!(!repo.contains("A/b.md"));
        assert!(!repo.contains("A"));
        assert!(ids(&repo, "").is_empty());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_delete_stops_at_non_empty_parent() {
        let mut repo = NodeRepository::new();
        repo.insert(dir("", &["A"]).into());
        repo.insert(dir("A", &["A/b.md", "A/c.md"]).into());
        repo.insert(FileNode::new("A/b.md", "b.md").into());
        repo.insert(FileNode::new("A/c.md", "c.md").into());

        let removed = delete_node(&mut repo, "A/b.md", "").unwrap();

        assert_eq!(removed, vec!["A/b.md"]);
        assert_eq!(ids(&repo, "A"), vec!["A/c.md"]);
        assert_eq!(ids(&repo, ""), vec!["A"]);
    }

    #[test]
    fn test_delete_never_prunes_custom_origin() {
        let mut repo = NodeRepository::new();
        repo.insert(dir("notes", &["notes/sub"]).into());
        repo.insert(dir("notes/sub", &["notes/sub/x.md"]).into());
        repo.insert(FileNode::new("notes/sub/x.md", "x.md").into());

        let removed = delete_node(&mut repo, "notes/sub/x.md", "notes").unwrap();

        assert_eq!(removed, vec!["notes/sub/x.md", "notes/sub"]);
        assert!(repo.directory("notes").unwrap().items.is_empty());
    }

    #[test]
    fn test_unreferenced_child_still_deleted() {
        let mut repo = NodeRepository::new();
        repo.insert(dir("", &["keep.md"]).into());
        repo.insert(FileNode::new("keep.md", "keep.md").into());
        repo.insert(FileNode::new("stray.md", "stray.md").into());

        let removed = delete_node(&mut repo, "stray.md", "").unwrap();

        assert_eq!(removed, vec!["stray.md"]);
        assert_eq!(ids(&repo, ""), vec!["keep.md"]);
    }

    #[test]
    fn test_placeholder_without_origin_link_is_pruned() {
        // Top-level placeholders are not referenced by the origin
        let mut repo = NodeRepository::new();
        repo.insert(dir("", &["other.md"]).into());
        repo.insert(FileNode::new("other.md", "other.md").into());
        repo.insert(dir("A", &["A/b.md"]).into());
        repo.insert(FileNode::new("A/b.md", "b.md").into());

        let removed = delete_node(&mut repo, "A/b.md", "").unwrap();

        assert_eq!(removed, vec!["A/b.md", "A"]);
        assert_eq!(ids(&repo, ""), vec!["other.md"]);
    }

    #[test]
    fn test_missing_node_is_fatal() {
        let mut repo = NodeRepository::with_origin("");

        let err = delete_node(&mut repo, "nope.md", "").unwrap_err();

        assert_eq!(err, TreeError::MissingNode("nope.md".into()));
    }

    #[test]
    fn test_missing_parent_is_fatal_and_leaves_repository_intact() {
        let mut repo = NodeRepository::with_origin("");
        repo.insert(FileNode::new("a/b.md", "b.md").into());
        let before = repo.clone();

        let err = delete_node(&mut repo, "a/b.md", "").unwrap_err();

        assert_eq!(err, TreeError::MissingNode("a".into()));
        assert_eq!(repo, before);
    }

    #[test]
    fn test_origin_cannot_be_deleted() {
        let mut repo = NodeRepository::with_origin("");

        let err = delete_node(&mut repo, "", "").unwrap_err();

        assert_eq!(err, TreeError::OriginRemoval(String::new()));
        assert!(repo.contains(""));
    }
}
