//! Rename engine: re-keys a node and, for directories, its whole subtree.

use crate::node::{DirNode, FileNode, ItemRef, Node};
use crate::path;
use crate::repository::{NodeRepository, Result, TreeError};
use tracing::debug;

/// Move the node at `old_path` to `new_path`.
///
/// Directory descendants keep their own segment and take `new_path` as their
/// new prefix. Unless `skip_parent_update` is set, the reference held by the
/// old parent is replaced in place, keeping its position. Nested calls for
/// subdirectories skip that step since their parent is rebuilt by the caller.
///
/// Returns the node now registered at `new_path`. Dangling references below
/// `old_path`, a parent that isn't a directory, or a `new_path` that is already
/// taken fail the call before anything is moved.
pub fn rename(
    repository: &mut NodeRepository,
    old_path: &str,
    new_path: &str,
    skip_parent_update: bool,
) -> Result<Node> {
    repository.descendant_ids(old_path)?;
    if new_path != old_path && repository.contains(new_path) {
        return Err(TreeError::AlreadyExists(new_path.to_string()));
    }
    if !skip_parent_update {
        let parent = path::parent_id(old_path);
        if parent == old_path {
            return Err(TreeError::OriginRemoval(old_path.to_string()));
        }
        repository.directory(parent)?;
    }

    let renamed = rename_subtree(repository, old_path, new_path)?;

    if !skip_parent_update {
        let parent = repository.directory_mut(path::parent_id(old_path))?;
        if let Some(index) = parent.position_of(old_path) {
            parent.items[index] = ItemRef::new(new_path);
        }
    }

    debug!("Renamed {} -> {}", old_path, new_path);
    Ok(renamed)
}

fn rename_subtree(repository: &mut NodeRepository, old_path: &str, new_path: &str) -> Result<Node> {
    let existing = repository
        .remove(old_path)
        .ok_or_else(|| TreeError::MissingNode(old_path.to_string()))?;

    let renamed = match existing {
        Node::Dir(dir) => {
            let mut items = Vec::with_capacity(dir.items.len());
            for item in &dir.items {
                let segment = path::name(&item.id);
                let new_item = path::child_id(new_path, segment);
                match repository.get(&item.id) {
                    Some(Node::Dir(_)) => {
                        rename_subtree(repository, &item.id, &new_item)?;
                    }
                    Some(Node::File(_)) => {
                        repository.remove(&item.id);
                        repository.insert(FileNode::new(new_item.as_str(), segment).into());
                    }
                    // A duplicate reference whose node was already moved
                    None if repository.contains(&new_item) => {}
                    None => return Err(TreeError::MissingNode(item.id.clone())),
                }
                items.push(ItemRef::new(new_item));
            }
            Node::Dir(DirNode {
                id: new_path.to_string(),
                name: path::name(new_path).to_string(),
                items,
                ..dir
            })
        }
        Node::File(_) => FileNode::new(new_path, path::name(new_path)).into(),
    };

    repository.insert(renamed.clone());
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insert::insert_or_update;
    use crate::listing::{DocumentDescriptor, Payload};

    fn ids(repository: &NodeRepository, id: &str) -> Vec<String> {
        repository
            .directory(id)
            .unwrap()
            .items
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    fn listing(paths: &[&str]) -> Payload {
        Payload::Directory(paths.iter().map(|p| DocumentDescriptor::from_path(*p)).collect())
    }

    /// "" -> [top.md, p]; p -> [p/a.md, p/x]; p/x -> [p/x/b.md, p/x/y]; p/x/y -> [p/x/y/c.md]
    fn nested() -> NodeRepository {
        let mut repo = NodeRepository::with_origin("");
        insert_or_update(&mut repo, "top.md", &Payload::Document).unwrap();
        insert_or_update(&mut repo, "p", &listing(&["p/a.md"])).unwrap();
        insert_or_update(&mut repo, "p/x", &listing(&["p/x/b.md"])).unwrap();
        insert_or_update(&mut repo, "p/x/y", &listing(&["p/x/y/c.md"])).unwrap();
        repo
    }

    #[test]
    fn test_rename_document_keeps_position() {
        let mut repo = NodeRepository::with_origin("");
        insert_or_update(&mut repo, "a.md", &Payload::Document).unwrap();
        insert_or_update(&mut repo, "b.md", &Payload::Document).unwrap();
        insert_or_update(&mut repo, "c.md", &Payload::Document).unwrap();

        let renamed = rename(&mut repo, "b.md", "renamed.md", false).unwrap();

        assert_eq!(renamed, FileNode::new("renamed.md", "renamed.md").into());
        assert_eq!(ids(&repo, ""), vec!["a.md", "renamed.md", "c.md"]);
        assert!(!repo.contains("b.md"));
    }

    #[test]
    fn test_rename_directory_moves_subtree() {
        let mut repo = nested();
        repo.directory_mut("p/x").unwrap().expanded = false;

        let renamed = rename(&mut repo, "p", "q", false).unwrap();

        assert_eq!(renamed.name(), "q");
        assert_eq!(ids(&repo, ""), vec!["top.md", "q"]);
        assert_eq!(ids(&repo, "q"), vec!["q/a.md", "q/x"]);
        assert_eq!(ids(&repo, "q/x"), vec!["q/x/b.md", "q/x/y"]);
        assert_eq!(ids(&repo, "q/x/y"), vec!["q/x/y/c.md"]);
        assert!(!repo.directory("q/x").unwrap().expanded);

        let Some(Node::File(file)) = repo.get("q/x/y/c.md") else {
            panic!("expected a file node");
        };
        assert_eq!(file.link, "q/x/y/c.md");
        assert_eq!(file.name, "c.md");

        assert!(repo.ids().all(|id| id != "p" && !id.starts_with("p/")));
        assert_eq!(repo.len(), 8);
        assert!(repo.dangling_references().is_empty());
    }

    #[test]
    fn test_rename_to_same_path_is_identity() {
        let mut repo = nested();
        let before = repo.clone();

        let renamed = rename(&mut repo, "p", "p", false).unwrap();

        assert_eq!(Some(&renamed), before.get("p"));
        assert_eq!(repo, before);
    }

    #[test]
    fn test_nested_rename_leaves_parent_reference_alone() {
        let mut repo = nested();

        rename(&mut repo, "p/x", "p/z", true).unwrap();

        assert_eq!(ids(&repo, "p"), vec!["p/a.md", "p/x"]);
        assert_eq!(ids(&repo, "p/z"), vec!["p/z/b.md", "p/z/y"]);
    }

    #[test]
    fn test_move_keeps_reference_in_old_parent() {
        let mut repo = nested();

        rename(&mut repo, "p/a.md", "elsewhere/a.md", false).unwrap();

        assert_eq!(ids(&repo, "p"), vec!["elsewhere/a.md", "p/x"]);
        assert!(repo.contains("elsewhere/a.md"));
    }

    #[test]
    fn test_duplicate_references_are_renamed_once() {
        let mut repo = NodeRepository::with_origin("");
        insert_or_update(&mut repo, "d", &listing(&["d/a.md"])).unwrap();
        insert_or_update(&mut repo, "d", &listing(&["d/a.md"])).unwrap();

        rename(&mut repo, "d", "e", false).unwrap();

        assert_eq!(ids(&repo, "e"), vec!["e/a.md", "e/a.md"]);
        assert!(!repo.contains("d/a.md"));
    }

    #[test]
    fn test_rename_onto_existing_node_is_rejected() {
        let mut repo = NodeRepository::with_origin("");
        insert_or_update(&mut repo, "d", &listing(&["d/a.md", "d/b.md"])).unwrap();
        insert_or_update(&mut repo, "e", &listing(&[])).unwrap();
        let before = repo.clone();

        let err = rename(&mut repo, "d/a.md", "d/b.md", false).unwrap_err();
        assert_eq!(err, TreeError::AlreadyExists("d/b.md".into()));

        let err = rename(&mut repo, "d", "e", false).unwrap_err();
        assert_eq!(err, TreeError::AlreadyExists("e".into()));

        assert_eq!(repo, before);
    }

    #[test]
    fn test_missing_node_is_fatal() {
        let mut repo = NodeRepository::with_origin("");

        let err = rename(&mut repo, "nope.md", "yes.md", false).unwrap_err();

        assert_eq!(err, TreeError::MissingNode("nope.md".into()));
    }

    #[test]
    fn test_dangling_child_fails_before_moving_anything() {
        let mut repo = nested();
        repo.remove("p/x/y/c.md");
        let before = repo.clone();

        let err = rename(&mut repo, "p", "q", false).unwrap_err();

        assert_eq!(err, TreeError::MissingNode("p/x/y/c.md".into()));
        assert_eq!(repo, before);
    }
}
