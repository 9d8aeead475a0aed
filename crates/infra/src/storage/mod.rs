//! Durable storage adapters for the offline queue

pub mod json_store;

pub use json_store::JsonFileStore;
