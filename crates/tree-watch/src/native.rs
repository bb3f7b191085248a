//! Native listing source using tokio::fs.

use crate::config::full_path;
use async_trait::async_trait;
use shadow_tree::listing::Result;
use shadow_tree::path::{self, child_id};
use shadow_tree::{DocumentDescriptor, ListingError, ListingSource, Payload};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Lists documents and directories straight from the vault on disk.
///
/// Hidden entries (leading `.`) are skipped. Files only count as documents
/// when their extension is one of `extensions`.
pub struct NativeListings {
    base_path: PathBuf,
    extensions: Vec<String>,
}

impl NativeListings {
    pub fn new(base_path: PathBuf, extensions: Vec<String>) -> Self {
        Self {
            base_path,
            extensions,
        }
    }

    /// Whether a vault path names a document, judged by its extension.
    pub fn is_document(&self, target: &str) -> bool {
        is_document(&self.extensions, target)
    }

    /// Visible entries of a directory as (name, is_dir), sorted by name.
    async fn entries(&self, target: &str) -> Result<Vec<(String, bool)>> {
        let mut dir = fs::read_dir(full_path(&self.base_path, target))
            .await
            .map_err(|e| io_error(target, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| io_error(target, e))? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let metadata = entry.metadata().await.map_err(|e| io_error(target, e))?;
            entries.push((name, metadata.is_dir()));
        }

        entries.sort();
        Ok(entries)
    }
}

/// Shared by the listing source and the event filter.
pub(crate) fn is_document(extensions: &[String], target: &str) -> bool {
    let name = path::name(target);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_lowercase();
            extensions.iter().any(|allowed| *allowed == ext)
        }
        _ => false,
    }
}

fn io_error(target: &str, error: std::io::Error) -> ListingError {
    if error.kind() == ErrorKind::NotFound {
        ListingError::NotFound(target.to_string())
    } else {
        ListingError::Io(error.to_string())
    }
}

#[async_trait]
impl ListingSource for NativeListings {
    async fn describe(&self, target: &str) -> Result<Payload> {
        let metadata = fs::metadata(full_path(&self.base_path, target))
            .await
            .map_err(|e| io_error(target, e))?;
        if !metadata.is_dir() {
            return Ok(Payload::Document);
        }

        let documents = self
            .entries(target)
            .await?
            .into_iter()
            .filter(|(name, is_dir)| !is_dir && self.is_document(name))
            .map(|(name, _)| DocumentDescriptor::from_path(child_id(target, &name)))
            .collect();
        Ok(Payload::Directory(documents))
    }

    async fn subdirectories(&self, target: &str) -> Result<Vec<String>> {
        Ok(self
            .entries(target)
            .await?
            .into_iter()
            .filter(|(_, is_dir)| *is_dir)
            .map(|(name, _)| child_id(target, &name))
            .collect())
    }
}
