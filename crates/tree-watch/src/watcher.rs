//! File watcher for vault changes.
//!
//! Translates raw notify events into create/update, delete and rename
//! notifications relative to the vault, limited to the mirrored root.

use crate::config::WatchConfig;
use crate::native::is_document;
use anyhow::Result;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Filesystem notification, with vault-relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// A document or directory appeared or changed
    Upserted(String),
    /// A path disappeared
    Removed(String),
    /// A path was renamed within the mirrored root
    Renamed { from: String, to: String },
}

/// Decides which raw events matter and how they map to `FileEvent`s.
#[derive(Debug, Clone)]
pub struct EventFilter {
    vault_path: PathBuf,
    root: String,
    extensions: Vec<String>,
}

impl From<&WatchConfig> for EventFilter {
    fn from(config: &WatchConfig) -> Self {
        Self {
            vault_path: config.vault_path.clone(),
            root: config.root.clone(),
            extensions: config.extensions.clone(),
        }
    }
}

impl EventFilter {
    pub fn new(vault_path: PathBuf, root: impl Into<String>, extensions: Vec<String>) -> Self {
        Self {
            vault_path,
            root: root.into(),
            extensions,
        }
    }

    /// Map one raw event to zero or more file events.
    ///
    /// Only paired renames are reported as renames; the separate from/to halves
    /// notify emits alongside them are ignored. Content changes are ignored.
    pub fn translate(&self, event: &Event) -> Vec<FileEvent> {
        match &event.kind {
            EventKind::Create(_) => event
                .paths
                .iter()
                .filter_map(|path| self.upserted(path))
                .collect(),
            EventKind::Remove(_) => event
                .paths
                .iter()
                .filter_map(|path| self.relative(path))
                .map(FileEvent::Removed)
                .collect(),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.as_slice() {
                [from, to] => self.renamed(from, to).into_iter().collect(),
                _ => Vec::new(),
            },
            // Backends that can't pair renames report each side on its own
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => event
                .paths
                .iter()
                .filter_map(|path| {
                    if path.exists() {
                        self.upserted(path)
                    } else {
                        self.relative(path).map(FileEvent::Removed)
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Vault-relative path, if it is visible and inside the root.
    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.vault_path).ok()?;
        let relative = relative.to_str()?.replace('\\', "/");

        // Skip hidden files and directories
        if relative.split('/').any(|segment| segment.starts_with('.')) {
            return None;
        }

        let inside_root = self.root.is_empty()
            || relative == self.root
            || relative.starts_with(&format!("{}/", self.root));
        inside_root.then_some(relative)
    }

    fn upserted(&self, path: &Path) -> Option<FileEvent> {
        let relative = self.relative(path)?;
        if path.is_dir() || is_document(&self.extensions, &relative) {
            Some(FileEvent::Upserted(relative))
        } else {
            None
        }
    }

    fn renamed(&self, from: &Path, to: &Path) -> Option<FileEvent> {
        match (self.relative(from), self.relative(to)) {
            (Some(from), Some(to_relative))
                if to.is_dir() || is_document(&self.extensions, &to_relative) =>
            {
                Some(FileEvent::Renamed {
                    from,
                    to: to_relative,
                })
            }
            // Moved out of the root, hidden, or no longer a document
            (Some(from), _) => Some(FileEvent::Removed(from)),
            (None, Some(_)) => self.upserted(to),
            (None, None) => None,
        }
    }
}

/// File watcher that monitors the vault directory.
pub struct FileWatcher {
    /// Vault base path
    vault_path: PathBuf,
    /// Watcher handle (must keep alive)
    _watcher: RecommendedWatcher,
    /// Receiver for file events
    event_rx: mpsc::UnboundedReceiver<FileEvent>,
}

impl FileWatcher {
    /// Start watching the vault recursively.
    pub fn new(filter: EventFilter) -> Result<Self> {
        let vault_path = filter.vault_path.clone();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => {
                    for file_event in filter.translate(&event) {
                        debug!("File event: {:?}", file_event);
                        if event_tx.send(file_event).is_err() {
                            // Receiver dropped
                            return;
                        }
                    }
                }
                Err(e) => {
                    error!("File watcher error: {}", e);
                }
            }
        })?;

        watcher.watch(&vault_path, RecursiveMode::Recursive)?;

        Ok(Self {
            vault_path,
            _watcher: watcher,
            event_rx,
        })
    }

    /// Get the receiver for file events.
    pub fn event_rx(&mut self) -> &mut mpsc::UnboundedReceiver<FileEvent> {
        &mut self.event_rx
    }

    /// Get the vault path.
    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }
}
