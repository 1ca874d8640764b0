//! HTTP client for the catalog service.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::models::{Album, Artist, ArtistHub, CatalogEntity};
use super::trait_def::{Catalog, CatalogError};
use super::wire::{Envelope, HubContainer, MetadataContainer, RawMetadata};
use crate::config::PathRewrite;

/// Query parameter carrying the catalog credential.
const TOKEN_PARAM: &str = "X-Plex-Token";

/// HTTP client for the catalog service.
///
/// The credential is attached to every request; the client holds no other
/// session state.
pub struct PlexCatalogClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    section_id: u32,
    path_rewrite: Option<PathRewrite>,
}

impl PlexCatalogClient {
    /// Create a new catalog client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the catalog service (e.g., "http://localhost:32400")
    /// * `token` - Credential attached to every request
    /// * `section_id` - Library section holding the music
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(
        base_url: String,
        token: String,
        section_id: u32,
        timeout_sec: u64,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .map_err(|e| CatalogError::Upstream(format!("failed to create HTTP client: {}", e)))?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token,
            section_id,
            path_rewrite: None,
        })
    }

    /// Rewrite track file paths reported by the catalog onto the local filesystem.
    pub fn with_path_rewrite(mut self, rewrite: Option<PathRewrite>) -> Self {
        self.path_rewrite = rewrite;
        self
    }

    /// Get the base URL of the catalog service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Catalog request: GET {}", path);

        let response = self
            .client
            .get(&url)
            .query(&[(TOKEN_PARAM, self.token.as_str())])
            .query(query)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Upstream(e.without_url().to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let response = self.send(path, query).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::Malformed(format!("{}: {}", path, e.without_url())))?;
        Ok(envelope.media_container)
    }

    async fn get_metadata(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<CatalogEntity>, CatalogError> {
        let container: MetadataContainer = self.get_json(path, query).await?;
        self.convert_all(container.metadata)
    }

    /// Convert a listing, skipping items of types this client does not model.
    /// Listings such as recently added span every library section.
    fn convert_all(&self, items: Vec<RawMetadata>) -> Result<Vec<CatalogEntity>, CatalogError> {
        items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| {
                if !item.is_supported() {
                    debug!("Skipping item {} of type '{}'", item.rating_key, item.kind);
                }
                item.is_supported()
            })
            .map(|(position, item)| {
                item.into_entity(position as u32 + 1, self.path_rewrite.as_ref())
            })
            .collect()
    }
}

#[async_trait]
impl Catalog for PlexCatalogClient {
    async fn search(&self, query: &str) -> Result<Option<ArtistHub>, CatalogError> {
        let container: HubContainer = self
            .get_json(
                "/hubs/search",
                &[
                    ("query", query.to_string()),
                    ("sectionId", self.section_id.to_string()),
                ],
            )
            .await?;

        let Some(hub) = container.hubs.into_iter().find(|h| h.hub_type == "artist") else {
            return Ok(None);
        };

        let artists: Vec<Artist> = self
            .convert_all(hub.metadata)?
            .into_iter()
            .filter_map(|entity| match entity {
                CatalogEntity::Artist(artist) => Some(artist),
                _ => None,
            })
            .collect();

        if artists.is_empty() {
            return Ok(None);
        }
        Ok(Some(ArtistHub { artists }))
    }

    async fn fetch_by_id(&self, id: &str) -> Result<CatalogEntity, CatalogError> {
        let path = format!("/library/metadata/{}", urlencoding::encode(id));
        let container: MetadataContainer = self.get_json(&path, &[]).await?;
        container
            .metadata
            .into_iter()
            .next()
            .ok_or(CatalogError::NotFound(path))?
            .into_entity(0, self.path_rewrite.as_ref())
    }

    async fn fetch_children(&self, id: &str) -> Result<Vec<CatalogEntity>, CatalogError> {
        let path = format!("/library/metadata/{}/children", urlencoding::encode(id));
        self.get_metadata(&path, &[]).await
    }

    async fn refresh(&self) -> Result<(), CatalogError> {
        let path = format!("/library/sections/{}/refresh", self.section_id);
        self.send(&path, &[]).await?;
        Ok(())
    }

    async fn recently_added(&self, limit: u32) -> Result<Vec<Album>, CatalogError> {
        let entities = self
            .get_metadata("/library/recentlyAdded", &[("limit", limit.to_string())])
            .await?;

        Ok(entities
            .into_iter()
            .filter_map(|entity| match entity {
                CatalogEntity::Album(album) => Some(album),
                _ => None,
            })
            .take(limit as usize)
            .collect())
    }

    async fn find_artist_by_title(&self, title: &str) -> Result<Option<Artist>, CatalogError> {
        let path = format!("/library/sections/{}/all", self.section_id);
        let entities = self
            .get_metadata(&path, &[("title", title.to_string())])
            .await?;

        Ok(entities.into_iter().find_map(|entity| match entity {
            CatalogEntity::Artist(artist) => Some(artist),
            _ => None,
        }))
    }

    async fn fetch_artwork(&self, thumb: &str) -> Result<Vec<u8>, CatalogError> {
        let response = self.send(thumb, &[]).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Upstream(e.without_url().to_string()))?;
        Ok(bytes.to_vec())
    }
}
