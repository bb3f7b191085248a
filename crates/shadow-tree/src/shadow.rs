//! ShadowTree: the entry points a host calls when the vault changes.
//!
//! Each call runs one engine to completion against the owned repository and
//! then publishes the result on the tree's `EventBus`.

use crate::delete::delete_node;
use crate::events::{EventBus, TreeChange, TreeUpdate};
use crate::insert::insert_or_update;
use crate::listing::{ListingError, ListingSource, Payload};
use crate::node::{ItemRef, Node};
use crate::path;
use crate::rename::rename;
use crate::repository::{NodeRepository, TreeError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ShadowError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),
}

pub type Result<T> = std::result::Result<T, ShadowError>;

/// Mirror of one subtree of the vault, rooted at `origin`.
pub struct ShadowTree {
    repository: NodeRepository,
    origin: String,
    bus: Arc<EventBus>,
}

impl ShadowTree {
    /// Tree holding only the origin directory.
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self::with_repository(NodeRepository::with_origin(&origin), origin)
    }

    /// Wrap an existing repository. The origin node is assumed to be present.
    pub fn with_repository(repository: NodeRepository, origin: impl Into<String>) -> Self {
        Self {
            repository,
            origin: origin.into(),
            bus: Arc::new(EventBus::new()),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn repository(&self) -> &NodeRepository {
        &self.repository
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn contains(&self, path: &str) -> bool {
        self.repository.contains(path)
    }

    /// A document or directory was created or changed.
    pub fn on_create_or_update(&mut self, path: &str, payload: &Payload) -> Result<()> {
        insert_or_update(&mut self.repository, path, payload)?;
        self.publish(TreeChange::Upserted {
            path: path.to_string(),
        });
        Ok(())
    }

    /// A document or directory was deleted.
    ///
    /// Besides the node and any pruned ancestors, the descendants of a deleted
    /// directory are dropped so nothing is left unreachable.
    pub fn on_delete(&mut self, path: &str) -> Result<Vec<String>> {
        let descendants = self.repository.descendant_ids(path)?;
        let mut removed = delete_node(&mut self.repository, path, &self.origin)?;
        for descendant in descendants {
            self.repository.remove(&descendant);
            removed.push(descendant);
        }
        self.publish(TreeChange::Deleted {
            path: path.to_string(),
            removed: removed.clone(),
        });
        Ok(removed)
    }

    /// A document or directory was renamed.
    pub fn on_rename(&mut self, old_path: &str, new_path: &str) -> Result<Node> {
        let renamed = rename(&mut self.repository, old_path, new_path, false)?;
        self.publish(TreeChange::Renamed {
            from: old_path.to_string(),
            to: new_path.to_string(),
        });
        Ok(renamed)
    }

    /// Reference an existing node from its parent if the parent doesn't yet.
    ///
    /// Placeholders created directly below the top of the vault are not linked
    /// by the insert engine. This links such a directory once its own event
    /// arrives. Returns whether a reference was added.
    pub fn attach(&mut self, path: &str) -> Result<bool> {
        if path == self.origin || !self.repository.contains(path) {
            return Ok(false);
        }
        let parent = self.repository.directory_mut(path::parent_id(path))?;
        if parent.position_of(path).is_some() {
            return Ok(false);
        }
        parent.items.push(ItemRef::new(path));
        debug!("Attached {} to {:?}", path, path::parent_id(path));

        self.publish(TreeChange::Upserted {
            path: path.to_string(),
        });
        Ok(true)
    }

    /// Fetch the current payload for `path` and apply it.
    pub async fn refresh(&mut self, source: &dyn ListingSource, path: &str) -> Result<()> {
        let payload = source.describe(path).await?;
        self.on_create_or_update(path, &payload)
    }

    /// Populate the tree from the origin down, one directory at a time.
    ///
    /// Directories are visited parents first, siblings in the order the
    /// source returns them. Returns the number of directories inserted.
    pub async fn scan(&mut self, source: &dyn ListingSource) -> Result<usize> {
        let mut pending = vec![self.origin.clone()];
        let mut directories = 0;

        while let Some(dir) = pending.pop() {
            let payload = source.describe(&dir).await?;
            insert_or_update(&mut self.repository, &dir, &payload)?;
            directories += 1;

            let subdirectories = source.subdirectories(&dir).await?;
            pending.extend(subdirectories.into_iter().rev());
        }

        debug!("Scanned {} director(ies) under {:?}", directories, self.origin);
        self.publish(TreeChange::Scanned { directories });
        Ok(directories)
    }

    fn publish(&self, change: TreeChange) {
        if tracing::enabled!(tracing::Level::WARN) {
            let dangling = self.repository.dangling_references();
            if !dangling.is_empty() {
                warn!("Dangling references after {:?}: {:?}", change, dangling);
            }
        }

        if self.bus.subscriber_count() == 0 {
            return;
        }
        self.bus.emit(TreeUpdate {
            change,
            snapshot: Arc::new(self.repository.clone()),
        });
    }
}
