//! Insert/update engine: registers a document or directory and any missing
//! ancestor directories, and positions it inside its parent.

use crate::listing::Payload;
use crate::node::{DirNode, FileNode, ItemRef, Node};
use crate::path;
use crate::repository::{NodeRepository, Result, TreeError};
use tracing::debug;

/// Create or update the node at `path`.
///
/// Missing ancestors are created as expanded, empty placeholder directories and
/// linked to the ancestor above them. A new document is placed before the first
/// directory in its parent; a new directory is appended. When `path` already
/// exists as a directory (typically a placeholder), a directory payload's
/// entries are prepended to its items. Duplicate references are kept.
///
/// Fails without touching the repository if an existing ancestor is a
/// document, if a directory payload targets an existing document, or if the
/// parent of a new node is missing.
pub fn insert_or_update(repository: &mut NodeRepository, path: &str, payload: &Payload) -> Result<()> {
    let ancestors = path::ancestor_ids(path);
    let parent = path::parent_id(path);

    check_insert(repository, path, parent, &ancestors, payload)?;

    let mut previous: Option<&str> = None;
    for ancestor in &ancestors {
        if !repository.contains(ancestor) {
            repository.insert(DirNode::new(ancestor.as_str(), path::name(ancestor)).into());
            if let Some(above) = previous {
                repository
                    .directory_mut(above)?
                    .items
                    .push(ItemRef::new(ancestor.as_str()));
            }
            debug!("Created placeholder directory: {}", ancestor);
        }
        previous = Some(ancestor.as_str());
    }

    let candidate = build_candidate(path, payload);

    if repository.contains(path) {
        merge_existing(repository, path, candidate)?;
    } else {
        let is_dir = candidate.is_dir();
        repository.insert(candidate);
        if is_dir {
            repository.directory_mut(parent)?.items.push(ItemRef::new(path));
        } else {
            let first_dir = repository
                .directory(parent)?
                .items
                .iter()
                .position(|item| repository.get(&item.id).is_some_and(Node::is_dir));
            let items = &mut repository.directory_mut(parent)?.items;
            match first_dir {
                Some(index) => items.insert(index, ItemRef::new(path)),
                None => items.push(ItemRef::new(path)),
            }
        }
        debug!("Inserted {} into {:?}", path, parent);
    }

    if let Payload::Directory(documents) = payload {
        for document in documents {
            repository.insert(FileNode::new(document.path.as_str(), document.name.as_str()).into());
        }
        debug!("Registered {} document(s) under {}", documents.len(), path);
    }

    Ok(())
}

/// Reject calls that would hit an invariant violation part way through.
fn check_insert(
    repository: &NodeRepository,
    path: &str,
    parent: &str,
    ancestors: &[String],
    payload: &Payload,
) -> Result<()> {
    for ancestor in ancestors {
        if repository.contains(ancestor) {
            repository.directory(ancestor)?;
        }
    }

    match repository.get(path) {
        Some(Node::File(_)) if payload.is_directory() => {
            Err(TreeError::NotADirectory(path.to_string()))
        }
        Some(_) => Ok(()),
        // A parent inside the chain is created by the walk; the origin must already exist
        None if !ancestors.is_empty() => Ok(()),
        None => repository.directory(parent).map(|_| ()),
    }
}

fn build_candidate(path: &str, payload: &Payload) -> Node {
    let name = path::name(path);
    match payload {
        Payload::Directory(documents) => {
            let mut dir = DirNode::new(path, name);
            dir.items = documents
                .iter()
                .map(|document| ItemRef::new(document.path.as_str()))
                .collect();
            dir.into()
        }
        Payload::Document => FileNode::new(path, name).into(),
    }
}

/// Fold a candidate into the node already registered at `path`.
fn merge_existing(repository: &mut NodeRepository, path: &str, candidate: Node) -> Result<()> {
    match candidate {
        Node::Dir(incoming) => {
            let existing = repository.directory_mut(path)?;
            existing.items.splice(0..0, incoming.items);
            debug!("Merged listing into existing directory {}", path);
        }
        Node::File(_) => {
            debug!("Document {} already present", path);
        }
    }
    Ok(())
}
