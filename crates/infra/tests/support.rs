//! Shared helpers for infra integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use lifebridge_core::ConnectivityProbe;
use lifebridge_domain::{EventKind, LinkReading, OfflineEvent};
use serde_json::json;
use tokio::sync::watch;

/// Probe double with a manually controlled connectivity flag.
pub struct StaticProbe {
    online_tx: watch::Sender<bool>,
}

impl StaticProbe {
    pub fn new(online: bool) -> Arc<Self> {
        Arc::new(Self { online_tx: watch::Sender::new(online) })
    }

    pub fn set_online(&self, online: bool) {
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

/// The three event kinds the app captures, in capture order.
pub fn sample_events() -> Vec<OfflineEvent> {
    vec![
        OfflineEvent::with_timestamp(EventKind::Sign, json!({"gesture": "emergency"}), 1_000),
        OfflineEvent::with_timestamp(
            EventKind::Translation,
            json!({"text": "chest pain", "language": "en"}),
            2_000,
        ),
        OfflineEvent::with_timestamp(EventKind::System, json!({"battery": 40}), 3_000),
    ]
}
