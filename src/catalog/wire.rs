//! Response shapes of the catalog service's JSON API.
//!
//! Every payload is wrapped in a `MediaContainer`. Metadata items share one
//! loose shape whose `type` field decides which fields matter; conversion to
//! [`CatalogEntity`] is where that shape is checked.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::models::{Album, Artist, CatalogEntity, EntityKind, Track};
use super::trait_def::CatalogError;
use crate::config::PathRewrite;

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: T,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<RawMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HubContainer {
    #[serde(rename = "Hub", default)]
    pub hubs: Vec<RawHub>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHub {
    #[serde(rename = "type")]
    pub hub_type: String,
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<RawMetadata>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawTag {
    pub tag: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawPart {
    pub file: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawMedia {
    #[serde(rename = "Part", default)]
    pub parts: Vec<RawPart>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMetadata {
    pub rating_key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub parent_rating_key: Option<String>,
    pub parent_title: Option<String>,
    pub grandparent_title: Option<String>,
    pub original_title: Option<String>,
    pub year: Option<i32>,
    pub thumb: Option<String>,
    pub index: Option<u32>,
    pub duration: Option<u64>,
    #[serde(rename = "Genre", default)]
    pub genres: Vec<RawTag>,
    #[serde(rename = "Country", default)]
    pub countries: Vec<RawTag>,
    #[serde(rename = "Media", default)]
    pub media: Vec<RawMedia>,
}

impl RawMetadata {
    /// Whether `type` names an entity this client understands.
    pub fn is_supported(&self) -> bool {
        EntityKind::parse(&self.kind).is_some()
    }

    /// Validate the loose wire shape into a tagged entity.
    ///
    /// Tracks without an `index` get `fallback_index`, usually their
    /// 1-based position in the listing they came from.
    pub fn into_entity(
        self,
        fallback_index: u32,
        path_rewrite: Option<&PathRewrite>,
    ) -> Result<CatalogEntity, CatalogError> {
        let kind = EntityKind::parse(&self.kind).ok_or_else(|| {
            CatalogError::Malformed(format!(
                "item {} has unsupported type '{}'",
                self.rating_key, self.kind
            ))
        })?;

        let genres = self.genres.into_iter().map(|g| g.tag).collect();

        let entity = match kind {
            EntityKind::Artist => CatalogEntity::Artist(Artist {
                id: self.rating_key,
                title: self.title,
                genres,
                country: self.countries.into_iter().next().map(|c| c.tag),
                thumb: self.thumb,
            }),
            EntityKind::Album => CatalogEntity::Album(Album {
                id: self.rating_key,
                artist_id: self.parent_rating_key,
                artist_title: self.parent_title,
                title: self.title,
                year: self.year,
                genres,
                thumb: self.thumb,
            }),
            EntityKind::Track => {
                let index = self.index.unwrap_or(fallback_index);
                let file = self
                    .media
                    .iter()
                    .flat_map(|m| m.parts.iter())
                    .find_map(|p| p.file.as_deref())
                    .map(|f| rewrite_path(f, path_rewrite));
                CatalogEntity::Track(Track {
                    id: self.rating_key,
                    album_id: self.parent_rating_key,
                    index,
                    title: self.title,
                    duration_ms: self.duration.unwrap_or(0),
                    file,
                    performer: self.original_title.or(self.grandparent_title),
                })
            }
        };

        Ok(entity)
    }
}

/// Map a catalog-side file path onto the local filesystem.
pub(crate) fn rewrite_path(file: &str, rewrite: Option<&PathRewrite>) -> PathBuf {
    let path = Path::new(file);
    match rewrite.and_then(|r| path.strip_prefix(&r.catalog_prefix).ok().map(|rest| (r, rest))) {
        Some((rewrite, rest)) => rewrite.local_prefix.join(rest),
        None => path.to_path_buf(),
    }
}
