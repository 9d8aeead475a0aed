//! Domain types and models
//!
//! Types shared by the quality monitor, the offline queue, and the sync
//! driver. The serialized shape of [`OfflineEvent`] doubles as the persisted
//! queue layout and the ingest wire format, so field names here are load
//! bearing.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current epoch timestamp in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// ============================================================================
// Offline events
// ============================================================================

/// Category of a locally captured event awaiting delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Sign,
    Translation,
    System,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sign => write!(f, "sign"),
            Self::Translation => write!(f, "translation"),
            Self::System => write!(f, "system"),
        }
    }
}

/// A locally captured event pending delivery to the ingest endpoint.
///
/// Immutable once created. Owned by the queue from enqueue until acknowledged
/// delivery. Serializes as `{"type", "data", "timestamp"}`; this layout is
/// shared by the persisted queue file and the ingest request body.
///
/// Events carry no identifier; identity is structural equality over all three
/// fields, which is what batch removal uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: serde_json::Value,
    pub timestamp: i64,
}

impl OfflineEvent {
    /// Create a new event stamped with the current time.
    pub fn new(kind: EventKind, data: serde_json::Value) -> Self {
        Self { kind, data, timestamp: now_ms() }
    }

    /// Create an event with an explicit capture timestamp.
    pub fn with_timestamp(kind: EventKind, data: serde_json::Value, timestamp: i64) -> Self {
        Self { kind, data, timestamp }
    }
}

// ============================================================================
// Connection quality
// ============================================================================

/// Classified connection quality level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Excellent,
    Good,
    Poor,
    Offline,
}

impl ConnectionStatus {
    /// True when any connectivity is present at all.
    pub fn is_connected(self) -> bool {
        self != Self::Offline
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Poor => write!(f, "poor"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Effective link type reported by the platform network-information capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveType {
    #[serde(rename = "4g")]
    FourG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "slow-2g")]
    SlowTwoG,
}

/// Raw network-information reading consumed by the classifier.
///
/// Every field is optional; platforms without the capability produce `None`
/// readings and classification degrades to the connectivity flag alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkReading {
    pub effective_type: Option<EffectiveType>,
    pub rtt_ms: Option<u32>,
    pub downlink_mbps: Option<f64>,
}

/// One classified reading of current network capability.
///
/// Superseded, not accumulated: consumers only ever hold the latest sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSample {
    pub status: ConnectionStatus,
    pub latency_ms: u32,
    pub strength_pct: u8,
    pub sampled_at: i64,
}

impl ConnectionSample {
    /// The sample assumed before any probe reading has been taken.
    pub fn initial() -> Self {
        Self {
            status: ConnectionStatus::Excellent,
            latency_ms: crate::constants::DEFAULT_LATENCY_MS,
            strength_pct: crate::constants::MAX_STRENGTH_PCT,
            sampled_at: now_ms(),
        }
    }
}

// ============================================================================
// Sync batches
// ============================================================================

/// Immutable snapshot of the queue captured at the start of a flush.
///
/// Removal after acknowledgement is computed from this snapshot, never from
/// the live queue, so events enqueued while the flush is in flight survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncBatch {
    /// Correlation id for this flush attempt, also sent as the idempotency
    /// header on the delivery request.
    pub flush_id: Uuid,
    pub events: Vec<OfflineEvent>,
}

impl SyncBatch {
    /// Snapshot the given events into a new batch with a fresh flush id.
    pub fn new(events: Vec<OfflineEvent>) -> Self {
        Self { flush_id: Uuid::new_v4(), events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
