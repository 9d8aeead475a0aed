//! Port interfaces for sync operations

use async_trait::async_trait;
use lifebridge_domain::{OfflineEvent, Result, SyncBatch};

/// Trait for the durable backing store of the offline queue.
///
/// Implementations hold one serialized event sequence under a single fixed
/// storage key. Both operations act on the full sequence; the queue service
/// serializes its read-modify-write cycles around them.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Load the full persisted sequence.
    ///
    /// Malformed persisted data is not an error; implementations return an
    /// empty sequence for it. Errors are reserved for the storage layer
    /// itself being unavailable.
    async fn load(&self) -> Result<Vec<OfflineEvent>>;

    /// Replace the persisted sequence with `events`.
    async fn save(&self, events: &[OfflineEvent]) -> Result<()>;
}

/// Acknowledgement returned by the ingest endpoint on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Number of events the endpoint reported accepting
    pub accepted: usize,
}

/// Trait for delivering a batch to the external ingest endpoint.
#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// Deliver the whole batch as one request.
    ///
    /// `Ok` means the endpoint positively acknowledged the batch; any error
    /// means the batch must be retained for a later flush.
    async fn deliver(&self, batch: &SyncBatch) -> Result<DeliveryReceipt>;
}
