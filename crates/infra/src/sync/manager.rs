//! Sync manager with explicit lifecycle management.
//!
//! Owns the background trigger loop that keeps the offline pipeline moving:
//! every tick it refreshes the connectivity probe, publishes a fresh quality
//! sample, and attempts a flush; connectivity transitions trigger the same
//! work immediately instead of waiting for the next tick. Join handles are
//! tracked, cancellation is explicit, and stopping waits for the loop with a
//! timeout.
//!
//! # Example
//!
//! ```no_run
//! use lifebridge_domain::Config;
//! use lifebridge_infra::SyncManager;
//!
//! # async fn example() -> Result<(), String> {
//! let config = Config::default();
//! let mut manager = SyncManager::from_config(&config).map_err(|e| e.to_string())?;
//!
//! manager.start().await?;
//! // ... application runs, events get enqueued and flushed ...
//! manager.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use lifebridge_core::{ConnectionQualityMonitor, ConnectivityProbe, OfflineEventQueue, SyncDriver};
use lifebridge_domain::constants::{DELIVERY_TIMEOUT_SECS, SAMPLE_INTERVAL_SECS};
use lifebridge_domain::{Config, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::http::{IngestClient, IngestClientConfig};
use crate::probe::{TcpProbe, TcpProbeConfig};
use crate::storage::JsonFileStore;

/// Configuration for the sync manager.
#[derive(Debug, Clone)]
pub struct SyncManagerConfig {
    /// Interval between trigger ticks
    pub tick_interval: Duration,
    /// Whether the trigger loop is started at all
    pub enabled: bool,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for SyncManagerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(SAMPLE_INTERVAL_SECS),
            enabled: true,
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Sync manager with explicit lifecycle management.
pub struct SyncManager {
    queue: Arc<OfflineEventQueue>,
    monitor: Arc<ConnectionQualityMonitor>,
    driver: Arc<SyncDriver>,
    probe: Arc<dyn ConnectivityProbe>,
    config: SyncManagerConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl SyncManager {
    /// Create a manager over already-wired components.
    pub fn new(
        queue: Arc<OfflineEventQueue>,
        monitor: Arc<ConnectionQualityMonitor>,
        driver: Arc<SyncDriver>,
        probe: Arc<dyn ConnectivityProbe>,
        config: SyncManagerConfig,
    ) -> Self {
        Self {
            queue,
            monitor,
            driver,
            probe,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Build the full pipeline from application configuration.
    ///
    /// Wires the JSON-file store into the queue, the reqwest ingest client
    /// into the driver, and the TCP probe into both the monitor and the
    /// driver.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(JsonFileStore::new(config.storage.queue_path.clone()));
        let queue = Arc::new(OfflineEventQueue::new(store));

        let transport = Arc::new(IngestClient::new(IngestClientConfig {
            base_url: config.sync.endpoint_url.clone(),
            timeout: Duration::from_secs(DELIVERY_TIMEOUT_SECS),
        })?);

        let probe: Arc<dyn ConnectivityProbe> = Arc::new(TcpProbe::new(TcpProbeConfig {
            target: config.monitor.probe_target.clone(),
            ..TcpProbeConfig::default()
        }));

        let monitor = Arc::new(ConnectionQualityMonitor::new(Arc::clone(&probe)));
        let driver =
            Arc::new(SyncDriver::new(Arc::clone(&queue), transport, Arc::clone(&probe)));

        let manager_config = SyncManagerConfig {
            tick_interval: Duration::from_secs(config.sync.interval_seconds),
            enabled: config.sync.enabled,
            ..SyncManagerConfig::default()
        };

        Ok(Self::new(queue, monitor, driver, probe, manager_config))
    }

    /// The offline queue events are enqueued to.
    pub fn queue(&self) -> Arc<OfflineEventQueue> {
        Arc::clone(&self.queue)
    }

    /// The quality monitor publishing connection samples.
    pub fn monitor(&self) -> Arc<ConnectionQualityMonitor> {
        Arc::clone(&self.monitor)
    }

    /// The driver, for manually triggered flushes.
    pub fn driver(&self) -> Arc<SyncDriver> {
        Arc::clone(&self.driver)
    }

    /// Start the manager, spawning the background trigger loop.
    ///
    /// When sync is disabled in configuration no loop is spawned and the
    /// manager stays in the not-running state.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> std::result::Result<(), String> {
        if self.is_running() {
            return Err("Sync manager already running".to_string());
        }

        if !self.config.enabled {
            info!("Sync disabled in configuration; trigger loop not started");
            return Ok(());
        }

        info!("Starting sync manager");

        // Create fresh cancellation token
        self.cancellation = CancellationToken::new();

        let monitor = Arc::clone(&self.monitor);
        let driver = Arc::clone(&self.driver);
        let probe = Arc::clone(&self.probe);
        let tick_interval = self.config.tick_interval;
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::trigger_loop(monitor, driver, probe, tick_interval, cancel).await;
        });

        self.task_handle = Some(handle);
        info!("Sync manager started");

        Ok(())
    }

    /// Stop the manager and wait for the trigger loop to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> std::result::Result<(), String> {
        if !self.is_running() {
            return Err("Sync manager not running".to_string());
        }

        info!("Stopping sync manager");

        // Cancel background task
        self.cancellation.cancel();

        // Await join handle with timeout
        if let Some(handle) = self.task_handle.take() {
            let join_timeout = self.config.join_timeout;
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Trigger loop panicked: {}", e);
                    return Err("Trigger loop panicked".to_string());
                }
                Err(_) => {
                    warn!("Trigger loop did not complete within timeout");
                    return Err("Trigger loop timeout".to_string());
                }
            }
        }

        info!("Sync manager stopped");
        self.cancellation = CancellationToken::new();

        Ok(())
    }

    /// Returns true when the trigger loop is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Background trigger loop.
    ///
    /// The first tick fires immediately, so the monitor publishes a real
    /// sample as soon as the manager starts.
    async fn trigger_loop(
        monitor: Arc<ConnectionQualityMonitor>,
        driver: Arc<SyncDriver>,
        probe: Arc<dyn ConnectivityProbe>,
        tick_interval: Duration,
        cancel: CancellationToken,
    ) {
        let mut online_rx = probe.subscribe_online();
        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Trigger loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    probe.refresh().await;
                    let sample = monitor.sample();
                    debug!(status = %sample.status, "Tick sample");
                    let outcome = driver.try_flush().await;
                    debug!(?outcome, "Tick flush");
                }
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        // Probe dropped its sender; ticks keep the loop alive
                        warn!("Connectivity transition channel closed");
                        break;
                    }
                    let online = *online_rx.borrow_and_update();
                    info!(online, "Connectivity transition");
                    monitor.sample();
                    let outcome = driver.try_flush().await;
                    debug!(?outcome, "Transition flush");
                }
            }
        }
    }
}

impl Drop for SyncManager {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncManager dropped while running; cancelling trigger loop");
            self.cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use lifebridge_core::{BatchTransport, DeliveryReceipt, EventStore};
    use lifebridge_domain::{
        ConnectionStatus, EventKind, LinkReading, OfflineEvent, Result as DomainResult, SyncBatch,
    };
    use serde_json::json;
    use tokio::sync::watch;

    use super::*;

    struct MemoryStore {
        events: Mutex<Vec<OfflineEvent>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self { events: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl EventStore for MemoryStore {
        async fn load(&self) -> DomainResult<Vec<OfflineEvent>> {
            Ok(self.events.lock().unwrap().clone())
        }

        async fn save(&self, events: &[OfflineEvent]) -> DomainResult<()> {
            *self.events.lock().unwrap() = events.to_vec();
            Ok(())
        }
    }

    struct StaticProbe {
        online_tx: watch::Sender<bool>,
    }

    impl StaticProbe {
        fn new(online: bool) -> Self {
            Self { online_tx: watch::Sender::new(online) }
        }

        fn set_online(&self, online: bool) {
            self.online_tx.send_replace(online);
        }
    }

    #[async_trait]
    impl ConnectivityProbe for StaticProbe {
        fn is_online(&self) -> bool {
            *self.online_tx.borrow()
        }

        fn link_reading(&self) -> Option<LinkReading> {
            None
        }

        fn subscribe_online(&self) -> watch::Receiver<bool> {
            self.online_tx.subscribe()
        }
    }

    struct CountingTransport {
        calls: AtomicUsize,
    }

    impl CountingTransport {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BatchTransport for CountingTransport {
        async fn deliver(&self, batch: &SyncBatch) -> DomainResult<DeliveryReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DeliveryReceipt { accepted: batch.len() })
        }
    }

    fn build_manager(
        probe: Arc<StaticProbe>,
        transport: Arc<CountingTransport>,
        tick_interval: Duration,
    ) -> SyncManager {
        let probe_trait: Arc<dyn ConnectivityProbe> = probe;
        let queue = Arc::new(OfflineEventQueue::new(Arc::new(MemoryStore::new())));
        let monitor = Arc::new(ConnectionQualityMonitor::new(Arc::clone(&probe_trait)));
        let driver =
            Arc::new(SyncDriver::new(Arc::clone(&queue), transport, Arc::clone(&probe_trait)));
        let config = SyncManagerConfig {
            tick_interval,
            join_timeout: Duration::from_secs(1),
            ..SyncManagerConfig::default()
        };
        SyncManager::new(queue, monitor, driver, probe_trait, config)
    }

    #[tokio::test]
    async fn start_and_stop_lifecycle() {
        let probe = Arc::new(StaticProbe::new(true));
        let transport = Arc::new(CountingTransport::new());
        let mut manager = build_manager(probe, transport, Duration::from_secs(60));

        assert!(!manager.is_running());
        manager.start().await.unwrap();
        assert!(manager.is_running());
        assert!(manager.start().await.is_err());

        manager.stop().await.unwrap();
        assert!(!manager.is_running());
        assert!(manager.stop().await.is_err());
    }

    #[tokio::test]
    async fn disabled_manager_does_not_spawn() {
        let probe = Arc::new(StaticProbe::new(true));
        let transport = Arc::new(CountingTransport::new());
        let mut manager = build_manager(probe, transport, Duration::from_millis(10));
        manager.config.enabled = false;

        manager.start().await.unwrap();
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn tick_drains_queue_while_online() {
        let probe = Arc::new(StaticProbe::new(true));
        let transport = Arc::new(CountingTransport::new());
        let mut manager =
            build_manager(Arc::clone(&probe), Arc::clone(&transport), Duration::from_millis(10));

        let queue = manager.queue();
        queue.enqueue(OfflineEvent::new(EventKind::Sign, json!({"gesture": "help"}))).await;

        manager.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        manager.stop().await.unwrap();

        assert!(queue.is_empty().await);
        assert!(transport.calls() >= 1);
    }

    #[tokio::test]
    async fn transition_to_online_triggers_flush() {
        let probe = Arc::new(StaticProbe::new(false));
        let transport = Arc::new(CountingTransport::new());
        let mut manager =
            build_manager(Arc::clone(&probe), Arc::clone(&transport), Duration::from_secs(60));

        let queue = manager.queue();
        queue.enqueue(OfflineEvent::new(EventKind::Translation, json!({"text": "pain"}))).await;

        manager.start().await.unwrap();

        // The immediate first tick sees an offline probe and skips
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(transport.calls(), 0);
        assert_eq!(queue.len().await, 1);

        probe.set_online(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        manager.stop().await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn transition_updates_published_sample() {
        let probe = Arc::new(StaticProbe::new(false));
        let transport = Arc::new(CountingTransport::new());
        let mut manager =
            build_manager(Arc::clone(&probe), transport, Duration::from_secs(60));

        let monitor = manager.monitor();
        manager.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(monitor.current().status, ConnectionStatus::Offline);

        probe.set_online(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        manager.stop().await.unwrap();

        assert_eq!(monitor.current().status, ConnectionStatus::Excellent);
    }
}
