//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Offline queue persistence
pub const OFFLINE_QUEUE_FILE: &str = "lifebridge_offline_events.json";

// Connection quality sampling
pub const SAMPLE_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_LATENCY_MS: u32 = 50;
pub const DEFAULT_DOWNLINK_MBPS: f64 = 1.0;
pub const STRENGTH_PER_MBPS: f64 = 20.0;
pub const MAX_STRENGTH_PCT: u8 = 100;

// Sync delivery
pub const SYNC_PATH: &str = "/sync";
pub const FLUSH_ID_HEADER: &str = "X-Flush-Id";
pub const DELIVERY_TIMEOUT_SECS: u64 = 30;
