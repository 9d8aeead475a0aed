//! Ingest endpoint client.
//!
//! Delivers a [`SyncBatch`] to the server-side ingest handler as one
//! `POST {base_url}/sync` request with body `{"events": [...]}`. The endpoint
//! replies `{"received": n}` on success; the client classifies responses as
//! success or failure only and does not interpret the body further.

use std::time::Duration;

use async_trait::async_trait;
use lifebridge_core::{BatchTransport, DeliveryReceipt};
use lifebridge_domain::constants::{DELIVERY_TIMEOUT_SECS, FLUSH_ID_HEADER, SYNC_PATH};
use lifebridge_domain::{LifeBridgeError, OfflineEvent, Result, SyncBatch};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Configuration for the ingest client
#[derive(Debug, Clone)]
pub struct IngestClientConfig {
    /// Base URL of the ingest endpoint
    pub base_url: String,
    /// Timeout for a single delivery request
    pub timeout: Duration,
}

impl Default for IngestClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(DELIVERY_TIMEOUT_SECS),
        }
    }
}

/// [`BatchTransport`] over HTTP via reqwest.
pub struct IngestClient {
    client: reqwest::Client,
    config: IngestClientConfig,
}

#[derive(Debug, Serialize)]
struct SyncRequest<'a> {
    events: &'a [OfflineEvent],
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    received: usize,
}

impl IngestClient {
    /// Create a client with the given configuration.
    pub fn new(config: IngestClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LifeBridgeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn sync_url(&self) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), SYNC_PATH)
    }
}

#[async_trait]
impl BatchTransport for IngestClient {
    #[instrument(skip(self, batch), fields(flush_id = %batch.flush_id, count = batch.len()))]
    async fn deliver(&self, batch: &SyncBatch) -> Result<DeliveryReceipt> {
        let response = self
            .client
            .post(self.sync_url())
            .header(FLUSH_ID_HEADER, batch.flush_id.to_string())
            .json(&SyncRequest { events: &batch.events })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LifeBridgeError::Network("delivery request timed out".to_string())
                } else {
                    LifeBridgeError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            // The accepted count is informational; an unparseable success
            // body still acknowledges the whole batch.
            let accepted = response
                .json::<SyncResponse>()
                .await
                .map(|body| body.received)
                .unwrap_or_else(|_| batch.len());

            debug!(%status, accepted, "Batch acknowledged");
            Ok(DeliveryReceipt { accepted })
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Ingest endpoint rejected batch");
            Err(LifeBridgeError::Network(format!("ingest endpoint returned {status}")))
        }
    }
}
