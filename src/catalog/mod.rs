//! Access to the external media catalog.
//!
//! The catalog service owns the library index. The courier searches it,
//! fetches artists, albums and tracks by id, and asks it to rescan after
//! new files land on disk.

mod client;
mod models;
mod trait_def;
mod wire;

pub use client::PlexCatalogClient;
pub use models::{Album, Artist, ArtistHub, CatalogEntity, EntityKind, Track};
pub use trait_def::{Catalog, CatalogError};
