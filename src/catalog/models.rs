//! Catalog models as seen by the rest of the courier.
//!
//! Responses from the catalog service are validated into these types at the
//! client boundary (see `wire.rs`); downstream code matches on
//! [`CatalogEntity`] instead of probing response fields.

use std::path::PathBuf;

use crate::caption::AlbumType;

/// Artist snapshot, fetched per request and never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artist {
    pub id: String,
    pub title: String,
    pub genres: Vec<String>,
    pub country: Option<String>,
    /// Catalog-relative path of the artist image.
    pub thumb: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Album {
    pub id: String,
    pub artist_id: Option<String>,
    pub artist_title: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    /// Catalog-relative path of the cover image.
    pub thumb: Option<String>,
}

impl Album {
    /// Classification is derived from the title on every call; it is never stored.
    pub fn album_type(&self) -> AlbumType {
        AlbumType::classify(&self.title)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub album_id: Option<String>,
    /// 1-based position within the album.
    pub index: u32,
    pub title: String,
    pub duration_ms: u64,
    /// Local path of the audio file, if the catalog reported one.
    pub file: Option<PathBuf>,
    pub performer: Option<String>,
}

/// A catalog entity, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogEntity {
    Artist(Artist),
    Album(Album),
    Track(Track),
}

impl CatalogEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            CatalogEntity::Artist(_) => EntityKind::Artist,
            CatalogEntity::Album(_) => EntityKind::Album,
            CatalogEntity::Track(_) => EntityKind::Track,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Album,
    Track,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "artist" => Some(Self::Artist),
            "album" => Some(Self::Album),
            "track" => Some(Self::Track),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The artist hub of a catalog search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistHub {
    pub artists: Vec<Artist>,
}
