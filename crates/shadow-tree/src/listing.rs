//! Directory listings: the payload handed to insert/update and the seam that
//! retrieves it.
//!
//! Implementations of `ListingSource`:
//! - `InMemoryListings` - For testing
//! - `NativeListings` (in tree-watch) - Uses tokio::fs

use crate::path;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, ListingError>;

/// A document inside a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    /// Full vault path of the document
    pub path: String,
    /// Display name of the document
    pub name: String,
}

impl DocumentDescriptor {
    /// Descriptor named after the last segment of `path`.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: path::name(&path).to_string(),
            path,
        }
    }
}

/// One row of a listing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub file: DocumentDescriptor,
}

/// Record describing a path as delivered by the host.
///
/// `rows` is present for directories and absent for documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<ListingEntry>>,
}

/// What a path denotes, as far as insert/update is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The path is a document
    Document,
    /// The path is a directory containing these documents, in display order
    Directory(Vec<DocumentDescriptor>),
}

impl Payload {
    pub fn is_directory(&self) -> bool {
        matches!(self, Payload::Directory(_))
    }
}

impl From<Listing> for Payload {
    fn from(listing: Listing) -> Self {
        match listing.rows {
            Some(rows) => Payload::Directory(rows.into_iter().map(|row| row.file).collect()),
            None => Payload::Document,
        }
    }
}

/// Retrieves directory listings from wherever the vault actually lives.
///
/// Implementations must be `Send + Sync` so a host can share them across tasks.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Describe `path`: a directory payload listing its documents, or a
    /// document marker.
    async fn describe(&self, path: &str) -> Result<Payload>;

    /// Ids of the immediate subdirectories of `path`, sorted.
    async fn subdirectories(&self, path: &str) -> Result<Vec<String>>;
}

/// In-memory listing source for testing
#[derive(Default)]
pub struct InMemoryListings {
    dirs: RwLock<BTreeSet<String>>,
    documents: RwLock<BTreeSet<String>>,
}

impl InMemoryListings {
    pub fn new() -> Self {
        let listings = Self::default();
        listings.add_dir("");
        listings
    }

    /// Add a directory and all of its ancestors.
    pub fn add_dir(&self, dir: &str) {
        let mut dirs = self.dirs.write().unwrap_or_else(|e| e.into_inner());
        dirs.insert(String::new());
        for ancestor in path::ancestor_ids(dir) {
            dirs.insert(ancestor);
        }
        dirs.insert(dir.to_string());
    }

    /// Add a document, creating its parent directories.
    pub fn add_document(&self, document: &str) {
        self.add_dir(path::parent_id(document));
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(document.to_string());
    }

    pub fn remove(&self, target: &str) {
        self.dirs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(target);
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(target);
    }

    fn is_child(parent: &str, candidate: &str) -> bool {
        !candidate.is_empty() && path::parent_id(candidate) == parent
    }
}

#[async_trait]
impl ListingSource for InMemoryListings {
    async fn describe(&self, target: &str) -> Result<Payload> {
        if self
            .dirs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(target)
        {
            let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
            let entries = documents
                .iter()
                .filter(|document| Self::is_child(target, document))
                .map(|document| DocumentDescriptor::from_path(document.as_str()))
                .collect();
            return Ok(Payload::Directory(entries));
        }

        if self
            .documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(target)
        {
            return Ok(Payload::Document);
        }

        Err(ListingError::NotFound(target.to_string()))
    }

    async fn subdirectories(&self, target: &str) -> Result<Vec<String>> {
        let dirs = self.dirs.read().unwrap_or_else(|e| e.into_inner());
        if !dirs.contains(target) {
            return Err(ListingError::NotFound(target.to_string()));
        }
        Ok(dirs
            .iter()
            .filter(|dir| Self::is_child(target, dir))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_without_rows_is_a_document() {
        let listing: Listing = serde_json::from_str("{}").unwrap();
        assert_eq!(Payload::from(listing), Payload::Document);
    }

    #[test]
    fn test_listing_rows_keep_their_order() {
        let json = r#"{
            "rows": [
                { "file": { "path": "a/z.md", "name": "z" } },
                { "file": { "path": "a/b.md", "name": "b" } }
            ]
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        let Payload::Directory(entries) = Payload::from(listing) else {
            panic!("expected a directory payload");
        };
        assert_eq!(entries[0].path, "a/z.md");
        assert_eq!(entries[0].name, "z");
        assert_eq!(entries[1].path, "a/b.md");
    }

    #[tokio::test]
    async fn test_in_memory_listings() {
        let listings = InMemoryListings::new();
        listings.add_document("notes/a.md");
        listings.add_document("notes/daily/today.md");
        listings.add_document("top.md");

        let Payload::Directory(entries) = listings.describe("notes").await.unwrap() else {
            panic!("expected a directory payload");
        };
        assert_eq!(entries, vec![DocumentDescriptor::from_path("notes/a.md")]);

        assert_eq!(
            listings.describe("notes/a.md").await.unwrap(),
            Payload::Document
        );
        assert!(matches!(
            listings.describe("missing").await,
            Err(ListingError::NotFound(_))
        ));

        assert_eq!(listings.subdirectories("").await.unwrap(), vec!["notes"]);
        assert_eq!(
            listings.subdirectories("notes").await.unwrap(),
            vec!["notes/daily"]
        );
    }
}
