//! Catalog Courier
//!
//! Ingests music submitted over chat into the library, keeps the catalog
//! service in sync and announces new releases to a channel. This library
//! exposes the internal modules for testing and for the binary.

pub mod acquisition;
pub mod archive;
pub mod bot;
pub mod browse;
pub mod caption;
pub mod catalog;
pub mod config;
pub mod pipeline;
pub mod publisher;
pub mod transport;

#[cfg(test)]
mod test_support;

// Re-export commonly used types for convenience
pub use catalog::{Catalog, CatalogError, PlexCatalogClient};
pub use config::AppConfig;
pub use pipeline::{IngestionPipeline, JobOutcome};
pub use transport::{ChatTarget, ChatTransport};
