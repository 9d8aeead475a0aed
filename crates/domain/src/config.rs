//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub monitor: MonitorConfig,
}

/// Offline queue storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the persisted queue file (the single fixed storage key)
    pub queue_path: String,
}

/// Sync delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the ingest endpoint; the batch is POSTed to `{base}/sync`
    pub endpoint_url: String,
    pub interval_seconds: u64,
    pub enabled: bool,
}

/// Connection quality monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub sample_interval_seconds: u64,
    /// `host:port` the TCP probe connects to when measuring reachability
    pub probe_target: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig { queue_path: constants::OFFLINE_QUEUE_FILE.to_string() },
            sync: SyncConfig {
                endpoint_url: "http://localhost:3000".to_string(),
                interval_seconds: constants::SAMPLE_INTERVAL_SECS,
                enabled: true,
            },
            monitor: MonitorConfig {
                sample_interval_seconds: constants::SAMPLE_INTERVAL_SECS,
                probe_target: "localhost:3000".to_string(),
            },
        }
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sync.endpoint_url.is_empty() {
            return Err("Sync endpoint URL must not be empty".to_string());
        }

        if self.sync.interval_seconds == 0 {
            return Err("Sync interval must be greater than 0".to_string());
        }

        if self.monitor.sample_interval_seconds == 0 {
            return Err("Sample interval must be greater than 0".to_string());
        }

        if self.storage.queue_path.is_empty() {
            return Err("Queue path must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let mut config = Config::default();
        config.sync.endpoint_url = String::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("endpoint URL"));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.sync.interval_seconds = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Sync interval"));
    }
}
