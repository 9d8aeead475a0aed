//! # LifeBridge Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Connection quality classification and monitoring
//! - The durable offline event queue service
//! - The sync driver state machine
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `lifebridge-domain`
//! - No file, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod quality;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use quality::ports::ConnectivityProbe;
pub use quality::{classify, ConnectionQualityMonitor};
pub use sync::ports::{BatchTransport, DeliveryReceipt, EventStore};
pub use sync::queue::OfflineEventQueue;
pub use sync::{FlushOutcome, SkipReason, SyncDriver};
