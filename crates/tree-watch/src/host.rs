//! Host: applies filesystem events to a shadow tree.
//!
//! The tree engines assume well-ordered events for paths they know about.
//! Everything else (removals of untracked paths, renames of unknown sources,
//! repeated creates) is settled here before an engine is called.

use crate::watcher::FileEvent;
use shadow_tree::path;
use shadow_tree::shadow::Result;
use shadow_tree::{ListingError, ListingSource, Payload, ShadowTree};
use tracing::{debug, info, warn};

pub struct Host<S: ListingSource> {
    tree: ShadowTree,
    listings: S,
}

impl<S: ListingSource> Host<S> {
    pub fn new(tree: ShadowTree, listings: S) -> Self {
        Self { tree, listings }
    }

    pub fn tree(&self) -> &ShadowTree {
        &self.tree
    }

    /// Populate the tree from disk.
    pub async fn scan(&mut self) -> Result<usize> {
        self.tree.scan(&self.listings).await
    }

    /// Apply a single file event.
    pub async fn apply(&mut self, event: FileEvent) -> Result<()> {
        match event {
            FileEvent::Upserted(target) => self.upsert(&target).await,
            FileEvent::Removed(target) => self.remove(&target),
            FileEvent::Renamed { from, to } => self.rename(&from, &to).await,
        }
    }

    async fn upsert(&mut self, target: &str) -> Result<()> {
        let payload = match self.listings.describe(target).await {
            Ok(payload) => payload,
            Err(ListingError::NotFound(_)) => {
                debug!("{} vanished before it could be listed", target);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        match payload {
            Payload::Document => {
                if self.tree.contains(target) {
                    debug!("Document already tracked: {}", target);
                    return Ok(());
                }
                self.tree.on_create_or_update(target, &Payload::Document)?;
                info!("Added document {}", target);
            }
            Payload::Directory(documents) => {
                let known = self.tree.contains(target);
                if known && self.tree.attach(target)? {
                    info!("Linked directory {} into its parent", target);
                }
                // Only documents the tree hasn't seen, so a repeated create doesn't duplicate items
                let documents: Vec<_> = documents
                    .into_iter()
                    .filter(|document| !self.tree.contains(&document.path))
                    .collect();
                if known && documents.is_empty() {
                    debug!("Directory already up to date: {}", target);
                    return Ok(());
                }

                let count = documents.len();
                self.tree
                    .on_create_or_update(target, &Payload::Directory(documents))?;
                info!("Added directory {} with {} document(s)", target, count);

                if !known {
                    for subdirectory in self.listings.subdirectories(target).await? {
                        Box::pin(self.upsert(&subdirectory)).await?;
                    }
                }
            }
        }
        Ok(())
    }

    fn remove(&mut self, target: &str) -> Result<()> {
        if target == self.tree.origin() {
            warn!("Root {:?} was removed on disk; keeping it in the tree", target);
            return Ok(());
        }
        if !self.tree.contains(target) {
            debug!("Ignoring removal of untracked path {}", target);
            return Ok(());
        }

        let removed = self.tree.on_delete(target)?;
        info!("Removed {} ({} node(s))", target, removed.len());
        Ok(())
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        if from == self.tree.origin() {
            warn!("Root {:?} was renamed on disk; keeping it in the tree", from);
            return Ok(());
        }
        if !self.tree.contains(from) {
            debug!("Rename source {} not tracked; treating {} as new", from, to);
            return self.upsert(to).await;
        }

        // Renames keep the reference in place, so moves between directories
        // are applied as a removal followed by a create
        if path::parent_id(from) != path::parent_id(to) {
            self.remove(from)?;
            return self.upsert(to).await;
        }

        // The target was replaced on disk, so the old node goes first
        if from != to && self.tree.contains(to) {
            self.remove(to)?;
        }

        self.tree.on_rename(from, to)?;
        info!("Renamed {} -> {}", from, to);
        Ok(())
    }
}
