//! tree-watch library: Exposes the host components for testing.
//!
//! This is a thin library layer over the binary, allowing integration tests
//! to drive the host without a terminal.

pub mod config;
pub mod host;
pub mod native;
pub mod render;
pub mod watcher;

// Re-export key types for convenience
pub use config::{ConfigError, WatchConfig};
pub use host::Host;
pub use native::NativeListings;
pub use render::render_outline;
pub use watcher::{EventFilter, FileEvent, FileWatcher};
