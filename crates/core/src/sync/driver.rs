//! Flush protocol state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lifebridge_domain::SyncBatch;
use tracing::{debug, info, instrument, warn};

use super::ports::BatchTransport;
use super::queue::OfflineEventQueue;
use crate::quality::ports::ConnectivityProbe;

/// Result of one flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// No delivery attempted
    Skipped(SkipReason),
    /// Batch acknowledged; this many delivered entries were removed
    Delivered(usize),
    /// Delivery failed; the queue is untouched and the next trigger retries
    Failed,
}

/// Why a flush attempt was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The connectivity flag reports no connection
    Offline,
    /// Another flush is already in flight; this trigger is dropped, not queued
    AlreadyInFlight,
    /// The snapshot taken at flush start was empty
    EmptyQueue,
}

/// Owns the flush state machine: IDLE -> FLUSHING -> IDLE.
///
/// At most one flush is in flight at any time, enforced by the in-flight flag.
/// The flag is set before control yields to the asynchronous send and cleared
/// on every exit path, including panics, via a drop guard.
pub struct SyncDriver {
    queue: Arc<OfflineEventQueue>,
    transport: Arc<dyn BatchTransport>,
    probe: Arc<dyn ConnectivityProbe>,
    in_flight: AtomicBool,
}

impl SyncDriver {
    /// Create a driver over the given queue, transport, and probe.
    pub fn new(
        queue: Arc<OfflineEventQueue>,
        transport: Arc<dyn BatchTransport>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self { queue, transport, probe, in_flight: AtomicBool::new(false) }
    }

    /// Attempt one flush of the queued events.
    ///
    /// Guards, in order: connectivity present, no flush already in flight,
    /// snapshot non-empty. A failed delivery leaves the queue untouched; every
    /// later trigger results in a fresh attempt, with no backoff budget here.
    #[instrument(skip(self))]
    pub async fn try_flush(&self) -> FlushOutcome {
        if !self.probe.is_online() {
            debug!("Flush skipped: offline");
            return FlushOutcome::Skipped(SkipReason::Offline);
        }

        // Claim the in-flight flag before the first await so an overlapping
        // trigger observes FLUSHING and is dropped.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Flush skipped: already in flight");
            return FlushOutcome::Skipped(SkipReason::AlreadyInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let batch = SyncBatch::new(self.queue.peek_all().await);
        if batch.is_empty() {
            return FlushOutcome::Skipped(SkipReason::EmptyQueue);
        }

        debug!(flush_id = %batch.flush_id, count = batch.len(), "Delivering batch");

        match self.transport.deliver(&batch).await {
            Ok(receipt) => {
                let removed = self.queue.remove_delivered(&batch).await;
                info!(
                    flush_id = %batch.flush_id,
                    flushed = removed,
                    accepted = receipt.accepted,
                    "Flushed offline events"
                );
                FlushOutcome::Delivered(removed)
            }
            Err(e) => {
                warn!(flush_id = %batch.flush_id, error = %e, "Flush failed; events retained");
                FlushOutcome::Failed
            }
        }
    }

    /// True while a flush is in flight.
    pub fn is_flushing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Clears the in-flight flag on every exit path of a flush.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
