//! Latest-wins connection quality monitor.

use std::sync::Arc;

use lifebridge_domain::ConnectionSample;
use tokio::sync::watch;
use tracing::debug;

use super::classifier::classify;
use super::ports::ConnectivityProbe;

/// Maintains the single process-wide "current sample".
///
/// Every sampling tick and every connectivity transition calls [`sample`],
/// which classifies the probe's current view and overwrites the published
/// sample. No history is retained; subscribers always observe the latest
/// reading.
///
/// [`sample`]: ConnectionQualityMonitor::sample
pub struct ConnectionQualityMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    current: watch::Sender<ConnectionSample>,
}

impl ConnectionQualityMonitor {
    /// Create a monitor over the given probe.
    ///
    /// Until the first tick the published sample is the optimistic initial
    /// reading (excellent, 50 ms, 100%).
    pub fn new(probe: Arc<dyn ConnectivityProbe>) -> Self {
        let (current, _) = watch::channel(ConnectionSample::initial());
        Self { probe, current }
    }

    /// Take a classified reading and publish it to subscribers.
    ///
    /// Synchronous and non-blocking; probe absence is not an error.
    pub fn sample(&self) -> ConnectionSample {
        let sample = classify(self.probe.link_reading(), self.probe.is_online());
        debug!(
            status = %sample.status,
            latency_ms = sample.latency_ms,
            strength_pct = sample.strength_pct,
            "Connection quality sampled"
        );
        self.current.send_replace(sample);
        sample
    }

    /// The most recently published sample.
    pub fn current(&self) -> ConnectionSample {
        *self.current.borrow()
    }

    /// Subscribe to sample updates.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionSample> {
        self.current.subscribe()
    }
}
