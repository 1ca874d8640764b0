//! Catalog trait definition.
//!
//! Every component that reads or refreshes the catalog receives an
//! `Arc<dyn Catalog>` constructed once at startup with its credential.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Album, Artist, ArtistHub, CatalogEntity, EntityKind, Track};

/// Failures talking to the catalog service. All of them are upstream
/// failures; the variants only say which part of the exchange went wrong.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Upstream(String),

    #[error("Catalog returned status {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Catalog entity not found: {0}")]
    NotFound(String),

    #[error("Catalog entity {id} is a {actual}, expected {expected}")]
    UnexpectedKind {
        id: String,
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error("Malformed catalog response: {0}")]
    Malformed(String),
}

/// Request/response façade over the catalog service. No retries, no caching.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Search artists. `None` when the service returns no artist hub.
    async fn search(&self, query: &str) -> Result<Option<ArtistHub>, CatalogError>;

    async fn fetch_by_id(&self, id: &str) -> Result<CatalogEntity, CatalogError>;

    /// Children in catalog order: albums under an artist, tracks under an album.
    async fn fetch_children(&self, id: &str) -> Result<Vec<CatalogEntity>, CatalogError>;

    /// Ask the service to rescan the music library. Only transport-level
    /// success is reported; the rescan itself is not awaited.
    async fn refresh(&self) -> Result<(), CatalogError>;

    /// Most recently added albums, newest first.
    async fn recently_added(&self, limit: u32) -> Result<Vec<Album>, CatalogError>;

    async fn find_artist_by_title(&self, title: &str) -> Result<Option<Artist>, CatalogError>;

    /// Download an image referenced by a `thumb` path.
    async fn fetch_artwork(&self, thumb: &str) -> Result<Vec<u8>, CatalogError>;

    async fn fetch_artist(&self, id: &str) -> Result<Artist, CatalogError> {
        match self.fetch_by_id(id).await? {
            CatalogEntity::Artist(artist) => Ok(artist),
            other => Err(CatalogError::UnexpectedKind {
                id: id.to_string(),
                expected: EntityKind::Artist,
                actual: other.kind(),
            }),
        }
    }

    async fn fetch_album(&self, id: &str) -> Result<Album, CatalogError> {
        match self.fetch_by_id(id).await? {
            CatalogEntity::Album(album) => Ok(album),
            other => Err(CatalogError::UnexpectedKind {
                id: id.to_string(),
                expected: EntityKind::Album,
                actual: other.kind(),
            }),
        }
    }

    async fn fetch_artist_albums(&self, artist_id: &str) -> Result<Vec<Album>, CatalogError> {
        let children = self.fetch_children(artist_id).await?;
        Ok(children
            .into_iter()
            .filter_map(|child| match child {
                CatalogEntity::Album(album) => Some(album),
                _ => None,
            })
            .collect())
    }

    async fn fetch_album_tracks(&self, album_id: &str) -> Result<Vec<Track>, CatalogError> {
        let children = self.fetch_children(album_id).await?;
        Ok(children
            .into_iter()
            .filter_map(|child| match child {
                CatalogEntity::Track(track) => Some(track),
                _ => None,
            })
            .collect())
    }
}
