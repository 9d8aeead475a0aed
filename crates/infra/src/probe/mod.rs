//! Connectivity probing adapters

pub mod tcp_probe;

pub use tcp_probe::{TcpProbe, TcpProbeConfig};
