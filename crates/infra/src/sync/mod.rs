//! Sync lifecycle management
//!
//! Wires the offline queue, quality monitor, and sync driver together and
//! runs the trigger loop that drives periodic sampling and flushing.

pub mod manager;

// Re-export commonly used items
pub use manager::{SyncManager, SyncManagerConfig};
