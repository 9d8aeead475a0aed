//! Offline event queue and flush protocol

pub mod driver;
pub mod ports;
pub mod queue;

pub use driver::{FlushOutcome, SkipReason, SyncDriver};
pub use ports::{BatchTransport, DeliveryReceipt, EventStore};
pub use queue::OfflineEventQueue;
