//! JSON-file event store.
//!
//! Persists the offline queue as one JSON array of `{type, data, timestamp}`
//! objects in a single file, the Rust rendition of the original single
//! localStorage key. Writes go through a temporary file and an atomic rename
//! so a crash mid-write leaves the previous sequence intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lifebridge_core::EventStore;
use lifebridge_domain::{LifeBridgeError, OfflineEvent, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// [`EventStore`] backed by a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store over the given file path.
    ///
    /// The file is created on first save; a missing file reads as an empty
    /// queue.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<OfflineEvent>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Queue file does not exist; empty queue");
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path).await.map_err(|e| {
            LifeBridgeError::Storage(format!("failed to read {}: {e}", self.path.display()))
        })?;

        match serde_json::from_slice::<Vec<OfflineEvent>>(&data) {
            Ok(events) => Ok(events),
            Err(e) => {
                // Malformed persisted data is an empty queue, never an error
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Persisted queue is corrupt; treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, events: &[OfflineEvent]) -> Result<()> {
        let data = serde_json::to_vec(events)
            .map_err(|e| LifeBridgeError::Storage(format!("failed to serialize queue: {e}")))?;

        // Write to a temporary file first for atomicity
        let temp_path = self.path.with_extension("tmp");

        if let Some(parent) = temp_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    LifeBridgeError::Storage(format!(
                        "failed to create {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(|e| {
                LifeBridgeError::Storage(format!("failed to open {}: {e}", temp_path.display()))
            })?;

        file.write_all(&data).await.map_err(|e| {
            LifeBridgeError::Storage(format!("failed to write {}: {e}", temp_path.display()))
        })?;
        file.sync_all().await.map_err(|e| {
            LifeBridgeError::Storage(format!("failed to sync {}: {e}", temp_path.display()))
        })?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            LifeBridgeError::Storage(format!("failed to rename to {}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), count = events.len(), "Queue persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lifebridge_domain::EventKind;
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("lifebridge_offline_events.json"))
    }

    fn event(n: i64) -> OfflineEvent {
        OfflineEvent::with_timestamp(EventKind::Sign, serde_json::json!({ "n": n }), n)
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.load().await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let events = vec![event(1), event(2), event(3)];
        store.save(&events).await.unwrap();

        assert_eq!(store.load().await.unwrap(), events);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty_without_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        std::fs::write(store.path(), b"{not json at all").unwrap();
        assert_eq!(store.load().await.unwrap(), Vec::new());

        // Valid JSON of the wrong shape is also corrupt
        std::fs::write(store.path(), b"{\"events\": 3}").unwrap();
        assert_eq!(store.load().await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/queue/events.json"));

        store.save(&[event(1)]).await.unwrap();
        assert_eq!(store.load().await.unwrap(), vec![event(1)]);
    }

    #[tokio::test]
    async fn test_persisted_layout_is_a_bare_array() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&[event(9)]).await.unwrap();

        let raw = std::fs::read(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "type": "sign", "data": { "n": 9 }, "timestamp": 9 }])
        );
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_sequence() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&[event(1), event(2)]).await.unwrap();
        store.save(&[event(2)]).await.unwrap();

        assert_eq!(store.load().await.unwrap(), vec![event(2)]);
    }
}
