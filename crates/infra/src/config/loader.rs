//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LIFEBRIDGE_SYNC_ENDPOINT`: Ingest endpoint base URL (required)
//! - `LIFEBRIDGE_SYNC_INTERVAL`: Flush trigger interval in seconds
//! - `LIFEBRIDGE_SYNC_ENABLED`: Whether sync is enabled (true/false)
//! - `LIFEBRIDGE_QUEUE_PATH`: Persisted queue file path
//! - `LIFEBRIDGE_SAMPLE_INTERVAL`: Quality sampling interval in seconds
//! - `LIFEBRIDGE_PROBE_TARGET`: `host:port` for the TCP connectivity probe
//!
//! ## File Locations
//! The loader probes `config.{toml,json}` and `lifebridge.{toml,json}` in the
//! current working directory, its parents, and next to the executable.

use std::path::{Path, PathBuf};

use lifebridge_domain::constants::SAMPLE_INTERVAL_SECS;
use lifebridge_domain::{
    Config, LifeBridgeError, MonitorConfig, Result, StorageConfig, SyncConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `LifeBridgeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation fails
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate().map_err(LifeBridgeError::Config)?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `LIFEBRIDGE_SYNC_ENDPOINT` is required; every other variable falls back to
/// its default. The probe target defaults to the endpoint's `host:port`.
///
/// # Errors
/// Returns `LifeBridgeError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let endpoint_url = env_var("LIFEBRIDGE_SYNC_ENDPOINT")?;

    let interval_seconds = env_u64("LIFEBRIDGE_SYNC_INTERVAL", SAMPLE_INTERVAL_SECS)?;
    let enabled = env_bool("LIFEBRIDGE_SYNC_ENABLED", true);
    let sample_interval_seconds = env_u64("LIFEBRIDGE_SAMPLE_INTERVAL", SAMPLE_INTERVAL_SECS)?;

    let queue_path = std::env::var("LIFEBRIDGE_QUEUE_PATH")
        .unwrap_or_else(|_| lifebridge_domain::constants::OFFLINE_QUEUE_FILE.to_string());

    let probe_target = std::env::var("LIFEBRIDGE_PROBE_TARGET")
        .unwrap_or_else(|_| host_port_of(&endpoint_url));

    Ok(Config {
        storage: StorageConfig { queue_path },
        sync: SyncConfig { endpoint_url, interval_seconds, enabled },
        monitor: MonitorConfig { sample_interval_seconds, probe_target },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `LifeBridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LifeBridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LifeBridgeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LifeBridgeError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format detected by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LifeBridgeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LifeBridgeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(LifeBridgeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory and up to two parents, then next to
/// the executable. Returns the first config file found.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for base in [cwd.clone(), cwd.join(".."), cwd.join("../..")] {
            candidates.push(base.join("config.toml"));
            candidates.push(base.join("config.json"));
            candidates.push(base.join("lifebridge.toml"));
            candidates.push(base.join("lifebridge.json"));
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join("config.toml"));
            candidates.push(exe_dir.join("config.json"));
            candidates.push(exe_dir.join("lifebridge.toml"));
            candidates.push(exe_dir.join("lifebridge.json"));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Strip the scheme and path from a URL, leaving `host[:port]`.
fn host_port_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme.split('/').next().unwrap_or(without_scheme).to_string()
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LifeBridgeError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse u64 from environment variable, with default when unset.
fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|e| LifeBridgeError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::Builder;

    use super::*;

    // Env vars are process-global; serialize the tests that touch them
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_load_from_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[storage]
queue_path = "/tmp/events.json"

[sync]
endpoint_url = "https://ingest.example.com"
interval_seconds = 10
enabled = true

[monitor]
sample_interval_seconds = 5
probe_target = "ingest.example.com:443"
"#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.sync.endpoint_url, "https://ingest.example.com");
        assert_eq!(config.sync.interval_seconds, 10);
        assert_eq!(config.storage.queue_path, "/tmp/events.json");
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "storage": {{ "queue_path": "events.json" }},
                "sync": {{
                    "endpoint_url": "http://localhost:3000",
                    "interval_seconds": 5,
                    "enabled": false
                }},
                "monitor": {{
                    "sample_interval_seconds": 5,
                    "probe_target": "localhost:3000"
                }}
            }}"#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert!(!config.sync.enabled);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(matches!(result, Err(LifeBridgeError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "not toml at all [[[").unwrap();

        let result = load_from_file(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(LifeBridgeError::Config(_))));
    }

    #[test]
    fn test_load_from_env_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();

        std::env::set_var("LIFEBRIDGE_SYNC_ENDPOINT", "https://api.example.com/v1");
        std::env::remove_var("LIFEBRIDGE_SYNC_INTERVAL");
        std::env::remove_var("LIFEBRIDGE_PROBE_TARGET");
        std::env::remove_var("LIFEBRIDGE_QUEUE_PATH");

        let config = load_from_env().unwrap();
        assert_eq!(config.sync.endpoint_url, "https://api.example.com/v1");
        assert_eq!(config.sync.interval_seconds, 5);
        // Probe target derived from the endpoint URL
        assert_eq!(config.monitor.probe_target, "api.example.com");

        std::env::remove_var("LIFEBRIDGE_SYNC_ENDPOINT");
    }

    #[test]
    fn test_load_from_env_requires_endpoint() {
        let _guard = ENV_LOCK.lock().unwrap();

        std::env::remove_var("LIFEBRIDGE_SYNC_ENDPOINT");
        assert!(matches!(load_from_env(), Err(LifeBridgeError::Config(_))));
    }

    #[test]
    fn test_host_port_of() {
        assert_eq!(host_port_of("https://api.example.com/v1/sync"), "api.example.com");
        assert_eq!(host_port_of("http://localhost:3000"), "localhost:3000");
        assert_eq!(host_port_of("localhost:3000"), "localhost:3000");
    }
}
