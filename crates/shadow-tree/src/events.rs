//! Publishing tree updates to observers.
//!
//! Every engine call made through `ShadowTree` ends with a `TreeUpdate` emitted
//! on the `EventBus`, carrying the change and a snapshot of the repository.

use crate::repository::NodeRepository;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// What changed in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TreeChange {
    /// A document or directory was created or updated.
    Upserted {
        /// Path passed to insert/update.
        path: String,
    },
    /// A node was deleted.
    Deleted {
        /// Path passed to delete.
        path: String,
        /// Every id removed, including pruned ancestors and dropped descendants.
        removed: Vec<String>,
    },
    /// A node (and its subtree) was re-keyed.
    Renamed {
        from: String,
        to: String,
    },
    /// The tree was populated from a listing source.
    Scanned {
        /// Number of directories inserted.
        directories: usize,
    },
}

/// A change together with the repository it produced.
#[derive(Debug, Clone)]
pub struct TreeUpdate {
    pub change: TreeChange,
    pub snapshot: Arc<NodeRepository>,
}

/// Subscription handle that unsubscribes automatically when dropped.
///
/// Follows the disposer pattern: hold this value to keep receiving updates,
/// drop it (or let it go out of scope) to unsubscribe.
pub struct Subscription {
    bus: Weak<EventBus>,
    id: usize,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}

type Callback = Arc<dyn Fn(&TreeUpdate) + Send + Sync>;

/// Event bus for publishing tree updates to subscribers.
///
/// Wrap in `Arc` to enable subscriptions.
#[derive(Default)]
pub struct EventBus {
    callbacks: RwLock<Vec<(usize, Callback)>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to updates. Returns `Subscription` that unsubscribes on drop.
    pub fn subscribe(
        self: &Arc<Self>,
        callback: impl Fn(&TreeUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(callback)));
        Subscription {
            bus: Arc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: usize) {
        // try_write: Drop may run during unwinding while emit holds a read lock
        if let Ok(mut guard) = self.callbacks.try_write() {
            guard.retain(|(i, _)| *i != id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Deliver `update` to every subscriber.
    pub fn emit(&self, update: TreeUpdate) {
        // Clone the list so a callback may subscribe without deadlocking
        let callbacks: Vec<_> = self
            .callbacks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(&update);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(path: &str) -> TreeUpdate {
        TreeUpdate {
            change: TreeChange::Upserted { path: path.into() },
            snapshot: Arc::new(NodeRepository::with_origin("")),
        }
    }

    #[test]
    fn test_subscribe_and_emit() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let _sub = bus.subscribe(move |update| {
            assert!(update.snapshot.contains(""));
            count_clone.fetch_add(1, Ordering::Relaxed);
        });

        bus.emit(update("a.md"));

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_subscription_unsubscribes_on_drop() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        {
            let _sub = bus.subscribe(move |_| {
                count_clone.fetch_add(1, Ordering::Relaxed);
            });
            bus.emit(update("a.md"));
            assert_eq!(bus.subscriber_count(), 1);
        }

        bus.emit(update("b.md"));

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_multiple_subscribers() {
        let bus = Arc::new(EventBus::new());
        let count1 = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::new(AtomicUsize::new(0));
        let count1_clone = Arc::clone(&count1);
        let count2_clone = Arc::clone(&count2);

        let sub1 = bus.subscribe(move |_| {
            count1_clone.fetch_add(1, Ordering::Relaxed);
        });
        let _sub2 = bus.subscribe(move |_| {
            count2_clone.fetch_add(1, Ordering::Relaxed);
        });

        bus.emit(update("a.md"));
        drop(sub1);
        bus.emit(update("b.md"));

        assert_eq!(count1.load(Ordering::Relaxed), 1);
        assert_eq!(count2.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_tree_change_serialization() {
        let change = TreeChange::Deleted {
            path: "a/b.md".into(),
            removed: vec!["a/b.md".into(), "a".into()],
        };

        let json = serde_json::to_string(&change).unwrap();
        assert!(json.contains("\"type\":\"deleted\""));
        assert!(json.contains("\"removed\":[\"a/b.md\",\"a\"]"));

        let json = serde_json::to_string(&TreeChange::Renamed {
            from: "a".into(),
            to: "b".into(),
        })
        .unwrap();
        assert!(json.contains("\"type\":\"renamed\""));
    }
}
