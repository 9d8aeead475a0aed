//! # LifeBridge Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The JSON-file event store backing the offline queue
//! - The reqwest-based ingest endpoint client
//! - The TCP connectivity probe
//! - Configuration loading
//! - The `SyncManager` lifecycle object wiring everything together
//!
//! ## Architecture
//! - Implements traits defined in `lifebridge-core`
//! - Depends on `lifebridge-domain` and `lifebridge-core`
//! - Contains all "impure" code (I/O, network, platform probing)

pub mod config;
pub mod http;
pub mod probe;
pub mod storage;
pub mod sync;

// Re-export commonly used items
pub use http::{IngestClient, IngestClientConfig};
pub use probe::{TcpProbe, TcpProbeConfig};
pub use storage::JsonFileStore;
pub use sync::{SyncManager, SyncManagerConfig};
