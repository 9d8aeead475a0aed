//! Pure connection quality classification.
//!
//! Maps a raw network-information reading plus the connectivity flag to a
//! classified [`ConnectionSample`]. Synchronous and non-blocking; this is the
//! only place the quality mapping lives.

use lifebridge_domain::constants::{
    DEFAULT_DOWNLINK_MBPS, DEFAULT_LATENCY_MS, MAX_STRENGTH_PCT, STRENGTH_PER_MBPS,
};
use lifebridge_domain::{now_ms, ConnectionSample, ConnectionStatus, EffectiveType, LinkReading};

/// Classify the current network capability.
///
/// Effective type drives the status when reported: `4g` is excellent, `3g`
/// good, `2g` poor. Anything else, including a missing reading, falls back to
/// the connectivity flag: offline when disconnected, excellent otherwise.
/// Latency defaults to 50 ms and downlink to 1 Mbps when unreported.
pub fn classify(reading: Option<LinkReading>, online: bool) -> ConnectionSample {
    let status = match reading.and_then(|r| r.effective_type) {
        Some(EffectiveType::FourG) => ConnectionStatus::Excellent,
        Some(EffectiveType::ThreeG) => ConnectionStatus::Good,
        Some(EffectiveType::TwoG) => ConnectionStatus::Poor,
        _ if online => ConnectionStatus::Excellent,
        _ => ConnectionStatus::Offline,
    };

    let latency_ms = reading.and_then(|r| r.rtt_ms).unwrap_or(DEFAULT_LATENCY_MS);

    let downlink = reading.and_then(|r| r.downlink_mbps).unwrap_or(DEFAULT_DOWNLINK_MBPS);
    let strength_pct = (downlink * STRENGTH_PER_MBPS).clamp(0.0, f64::from(MAX_STRENGTH_PCT)) as u8;

    ConnectionSample { status, latency_ms, strength_pct, sampled_at: now_ms() }
}
