//! NodeRepository: the path-indexed store every engine reads and writes.

use crate::node::{DirNode, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Invariant violations. These mean the host delivered events in an order the
/// engines don't expect, or that earlier state was corrupted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    MissingNode(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Origin cannot be removed: {0}")]
    OriginRemoval(String),
    #[error("Node already exists: {0}")]
    AlreadyExists(String),
}

pub type Result<T> = std::result::Result<T, TreeError>;

/// Mapping from path id to node.
///
/// Engines take `&mut NodeRepository` and run to completion one at a time;
/// there is no internal locking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRepository {
    nodes: HashMap<String, Node>,
}

impl NodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding only the origin directory.
    pub fn with_origin(origin: &str) -> Self {
        let mut repository = Self::new();
        repository.insert(DirNode::new(origin, crate::path::name(origin)).into());
        repository
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Register `node` under its own id, replacing whatever was there.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id().to_string(), node)
    }

    pub fn remove(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    /// Look up a node that must be a directory.
    pub fn directory(&self, id: &str) -> Result<&DirNode> {
        match self.nodes.get(id) {
            Some(Node::Dir(dir)) => Ok(dir),
            Some(Node::File(_)) => Err(TreeError::NotADirectory(id.to_string())),
            None => Err(TreeError::MissingNode(id.to_string())),
        }
    }

    /// Mutable variant of [`NodeRepository::directory`].
    pub fn directory_mut(&mut self, id: &str) -> Result<&mut DirNode> {
        match self.nodes.get_mut(id) {
            Some(Node::Dir(dir)) => Ok(dir),
            Some(Node::File(_)) => Err(TreeError::NotADirectory(id.to_string())),
            None => Err(TreeError::MissingNode(id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Ids below `id` in pre-order, following directory items.
    ///
    /// Fails if any reference along the way is dangling.
    pub fn descendant_ids(&self, id: &str) -> Result<Vec<String>> {
        let mut descendants = Vec::new();
        let mut pending = vec![id.to_string()];
        while let Some(current) = pending.pop() {
            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| TreeError::MissingNode(current.clone()))?;
            if let Node::Dir(dir) = node {
                pending.extend(dir.items.iter().rev().map(|item| item.id.clone()));
            }
            if current != id {
                descendants.push(current);
            }
        }
        Ok(descendants)
    }

    /// Every `(parent, child)` pair where a directory references a missing node.
    ///
    /// Empty whenever no engine call is in progress.
    pub fn dangling_references(&self) -> Vec<(String, String)> {
        let mut dangling: Vec<(String, String)> = self
            .nodes
            .values()
            .filter_map(Node::as_dir)
            .flat_map(|dir| {
                dir.items
                    .iter()
                    .filter(move |item| !self.nodes.contains_key(&item.id))
                    .map(move |item| (dir.id.clone(), item.id.clone()))
            })
            .collect();
        dangling.sort();
        dangling
    }
}
