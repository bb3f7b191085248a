//! shadow-tree: In-memory mirror of a vault's directory/document hierarchy.
//!
//! This crate provides:
//! - Path helpers for slash-delimited vault paths
//! - A path-indexed node repository (`File` / `Dir` nodes with id-only child references)
//! - Insert/update, delete-with-pruning, and recursive rename engines
//! - An event bus that republishes the repository after every change
//! - The `ListingSource` seam for retrieving directory listings

pub mod delete;
pub mod events;
pub mod insert;
pub mod listing;
pub mod node;
pub mod path;
pub mod rename;
pub mod repository;
pub mod shadow;

pub use delete::delete_node;
pub use events::{EventBus, Subscription, TreeChange, TreeUpdate};
pub use insert::insert_or_update;
pub use listing::{
    DocumentDescriptor, InMemoryListings, Listing, ListingEntry, ListingError, ListingSource,
    Payload,
};
pub use node::{DirNode, FileNode, ItemRef, Node};
pub use rename::rename;
pub use repository::{NodeRepository, TreeError};
pub use shadow::{ShadowError, ShadowTree};
