//! HTTP adapters for the ingest endpoint

pub mod ingest_client;

pub use ingest_client::{IngestClient, IngestClientConfig};
