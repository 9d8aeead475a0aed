//! TCP connectivity probe.
//!
//! Production adapter for the [`ConnectivityProbe`] port. Measures the TCP
//! connect round trip to a configured target on each refresh, derives an
//! effective link type from the measured RTT, and publishes online/offline
//! transitions on a watch channel. Downlink throughput is not measurable this
//! way and stays unreported, which the classifier tolerates.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lifebridge_core::ConnectivityProbe;
use lifebridge_domain::{EffectiveType, LinkReading};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Configuration for the TCP probe
#[derive(Debug, Clone)]
pub struct TcpProbeConfig {
    /// `host:port` to connect to when measuring reachability
    pub target: String,
    /// Give up on a connect attempt after this long
    pub connect_timeout: Duration,
}

impl Default for TcpProbeConfig {
    fn default() -> Self {
        Self { target: "localhost:3000".to_string(), connect_timeout: Duration::from_secs(2) }
    }
}

/// [`ConnectivityProbe`] backed by periodic TCP connect measurements.
pub struct TcpProbe {
    config: TcpProbeConfig,
    online_tx: watch::Sender<bool>,
    reading: RwLock<Option<LinkReading>>,
}

impl TcpProbe {
    /// Create a probe for the given target.
    ///
    /// Starts optimistic: online with no reading, matching the assumption
    /// made before the first measurement completes.
    pub fn new(config: TcpProbeConfig) -> Self {
        let (online_tx, _) = watch::channel(true);
        Self { config, online_tx, reading: RwLock::new(None) }
    }

    /// One TCP connect round trip to the target, or `None` when unreachable.
    async fn measure_rtt(&self) -> Option<u32> {
        let started = Instant::now();
        let connect = TcpStream::connect(&self.config.target);

        match tokio::time::timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(_stream)) => {
                let rtt = started.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
                Some(rtt)
            }
            Ok(Err(e)) => {
                debug!(target = %self.config.target, error = %e, "Probe connect failed");
                None
            }
            Err(_) => {
                debug!(target = %self.config.target, "Probe connect timed out");
                None
            }
        }
    }

    fn effective_type_for(rtt_ms: u32) -> EffectiveType {
        match rtt_ms {
            0..=149 => EffectiveType::FourG,
            150..=499 => EffectiveType::ThreeG,
            _ => EffectiveType::TwoG,
        }
    }

    fn publish(&self, online: bool, reading: Option<LinkReading>) {
        match self.reading.write() {
            Ok(mut slot) => *slot = reading,
            Err(e) => warn!(error = %e, "Probe reading lock poisoned"),
        }

        // Notify subscribers only on actual transitions
        self.online_tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn refresh(&self) {
        match self.measure_rtt().await {
            Some(rtt_ms) => {
                let reading = LinkReading {
                    effective_type: Some(Self::effective_type_for(rtt_ms)),
                    rtt_ms: Some(rtt_ms),
                    downlink_mbps: None,
                };
                self.publish(true, Some(reading));
            }
            None => self.publish(false, None),
        }
    }

    fn is_online(&self) -> bool {
        *self.online_tx.borrow()
    }

    fn link_reading(&self) -> Option<LinkReading> {
        self.reading.read().map(|slot| *slot).unwrap_or(None)
    }

    fn subscribe_online(&self) -> watch::Receiver<bool> {
        self.online_tx.subscribe()
    }
}
