//! Connection quality classification and monitoring

pub mod classifier;
pub mod monitor;
pub mod ports;

pub use classifier::classify;
pub use monitor::ConnectionQualityMonitor;
