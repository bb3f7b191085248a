//! Tree nodes: documents and directories keyed by their vault path.

use serde::{Deserialize, Serialize};

/// Id-only reference from a directory to one of its children.
///
/// The referenced node lives in the repository, never inside its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: String,
}

impl ItemRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A document in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Full path; unique key in the repository
    pub id: String,
    /// Display label (last path segment)
    pub name: String,
    /// Path of the underlying document
    pub link: String,
}

impl FileNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            link: id.clone(),
            name: name.into(),
            id,
        }
    }
}

/// A directory in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirNode {
    /// Full path; unique key in the repository
    pub id: String,
    /// Display label (last path segment)
    pub name: String,
    /// Ordered child references. Documents are listed before directories.
    pub items: Vec<ItemRef>,
    /// Expand/collapse state owned by the display layer
    pub expanded: bool,
}

impl DirNode {
    /// Empty, expanded directory.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items: Vec::new(),
            expanded: true,
        }
    }

    /// Position of the first reference to `id`, if any.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// A node in the shadow tree.
///
/// Serializes with a `type` tag of `"file"` or `"dir"`, which is the shape the
/// display store expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "file")]
    File(FileNode),
    #[serde(rename = "dir")]
    Dir(DirNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::File(file) => &file.id,
            Node::Dir(dir) => &dir.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => &file.name,
            Node::Dir(dir) => &dir.name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Dir(_))
    }

    pub fn as_dir(&self) -> Option<&DirNode> {
        match self {
            Node::Dir(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut DirNode> {
        match self {
            Node::Dir(dir) => Some(dir),
            Node::File(_) => None,
        }
    }
}

impl From<FileNode> for Node {
    fn from(file: FileNode) -> Self {
        Node::File(file)
    }
}

impl From<DirNode> for Node {
    fn from(dir: DirNode) -> Self {
        Node::Dir(dir)
    }
}
