//! Port interface for platform connectivity capabilities

use async_trait::async_trait;
use lifebridge_domain::LinkReading;
use tokio::sync::watch;

/// Abstraction over the platform's connectivity capabilities.
///
/// Covers the three optional platform inputs: the connectivity flag,
/// online/offline transition notifications, and network-information readings.
/// Absence of any capability degrades gracefully; none of the methods may
/// fail or block.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Refresh the probe's view of the network.
    ///
    /// Called once per trigger tick before sampling. Adapters without active
    /// measurement keep the default no-op.
    async fn refresh(&self) {}

    /// Current connectivity flag.
    fn is_online(&self) -> bool;

    /// Latest network-information reading, if the capability exists.
    fn link_reading(&self) -> Option<LinkReading>;

    /// Subscribe to online/offline transitions.
    ///
    /// The channel carries the connectivity flag; receivers observe a change
    /// whenever the flag flips.
    fn subscribe_online(&self) -> watch::Receiver<bool>;
}
