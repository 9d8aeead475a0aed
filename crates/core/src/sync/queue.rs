//! Durable, order-preserving buffer for events pending delivery.

use std::sync::Arc;

use lifebridge_domain::{OfflineEvent, SyncBatch};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::ports::EventStore;

/// FIFO queue of offline events over a durable [`EventStore`].
///
/// Every mutation is a read-modify-write against the full persisted snapshot,
/// serialized under the queue mutex so a concurrent enqueue and flush removal
/// cannot lose each other's update. Store failures never propagate to the
/// caller: reads degrade to an empty queue and failed writes drop the change
/// with a warning. Durability is best effort by design; the queue must never
/// block normal operation.
pub struct OfflineEventQueue {
    store: Arc<dyn EventStore>,
    write_lock: Mutex<()>,
}

impl OfflineEventQueue {
    /// Create a queue over the given store.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    /// Append an event to the persisted sequence.
    ///
    /// If the store rejects the write the event is dropped silently (logged
    /// at warn); the caller is never failed for a background concern.
    pub async fn enqueue(&self, event: OfflineEvent) {
        let _guard = self.write_lock.lock().await;

        let mut events = self.load_or_empty().await;
        events.push(event);

        if let Err(e) = self.store.save(&events).await {
            warn!(error = %e, "Dropping enqueued event: store rejected write");
        } else {
            debug!(queued = events.len(), "Event enqueued");
        }
    }

    /// Non-destructive snapshot of the current queue, in insertion order.
    pub async fn peek_all(&self) -> Vec<OfflineEvent> {
        self.load_or_empty().await
    }

    /// Remove exactly the entries that were present in `batch`.
    ///
    /// Matching is by event identity, first occurrence each, so entries
    /// enqueued after the batch was snapshotted survive and a repeated
    /// application is a no-op. Returns the number of entries removed.
    pub async fn remove_delivered(&self, batch: &SyncBatch) -> usize {
        let _guard = self.write_lock.lock().await;

        let events = self.load_or_empty().await;
        let mut pending: Vec<&OfflineEvent> = batch.events.iter().collect();
        let mut survivors = Vec::with_capacity(events.len());
        let mut removed = 0;

        for event in events {
            if let Some(pos) = pending.iter().position(|delivered| **delivered == event) {
                pending.swap_remove(pos);
                removed += 1;
            } else {
                survivors.push(event);
            }
        }

        if removed > 0 {
            if let Err(e) = self.store.save(&survivors).await {
                // Entries stay queued and may be delivered again; the
                // endpoint sees at-least-once in this case.
                warn!(error = %e, removed, "Failed to persist queue after removal");
            } else {
                debug!(removed, remaining = survivors.len(), "Delivered events removed");
            }
        }

        removed
    }

    /// Number of events currently queued.
    pub async fn len(&self) -> usize {
        self.peek_all().await.len()
    }

    /// Check if the queue is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn load_or_empty(&self) -> Vec<OfflineEvent> {
        match self.store.load().await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Treating unreadable queue store as empty");
                Vec::new()
            }
        }
    }
}
