//! Hand-written doubles for the catalog and the chat transport, shared by
//! the unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::catalog::{
    Album, Artist, ArtistHub, Catalog, CatalogEntity, CatalogError, Track,
};
use crate::transport::{ChatTarget, ChatTransport, Keyboard, MediaItem, MediaSource, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(String),
    Keyboard(String, Keyboard),
    Photo(Option<String>),
    Document(MediaSource),
    Group(Vec<MediaItem>),
}

/// Records every send. Optionally fails the n-th media group (zero-based).
#[derive(Default)]
pub struct MockTransport {
    pub sent: Mutex<Vec<(ChatTarget, Sent)>>,
    pub attachments: Mutex<HashMap<String, String>>,
    pub fail_on_group: Option<usize>,
    groups_seen: Mutex<usize>,
}

impl MockTransport {
    pub fn failing_group(n: usize) -> Self {
        Self {
            fail_on_group: Some(n),
            ..Default::default()
        }
    }

    pub fn with_attachment(self, file_id: &str, url: &str) -> Self {
        self.attachments
            .lock()
            .unwrap()
            .insert(file_id.to_string(), url.to_string());
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn sent_to(&self, target: &ChatTarget) -> Vec<Sent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, s)| s.clone())
            .collect()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TransportError> {
        let sent = match keyboard {
            Some(keyboard) => Sent::Keyboard(text.to_string(), keyboard),
            None => Sent::Text(text.to_string()),
        };
        self.sent.lock().unwrap().push((target.clone(), sent));
        Ok(())
    }

    async fn send_photo(
        &self,
        target: &ChatTarget,
        _photo: MediaSource,
        caption: Option<String>,
    ) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), Sent::Photo(caption)));
        Ok(())
    }

    async fn send_document(
        &self,
        target: &ChatTarget,
        document: MediaSource,
    ) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), Sent::Document(document)));
        Ok(())
    }

    async fn send_media_group(
        &self,
        target: &ChatTarget,
        items: Vec<MediaItem>,
    ) -> Result<(), TransportError> {
        let n = {
            let mut seen = self.groups_seen.lock().unwrap();
            let n = *seen;
            *seen += 1;
            n
        };
        if self.fail_on_group == Some(n) {
            return Err(TransportError::Request("flood control".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), Sent::Group(items)));
        Ok(())
    }

    async fn resolve_attachment(&self, file_id: &str) -> Result<String, TransportError> {
        self.attachments
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| TransportError::MissingAttachment(file_id.to_string()))
    }
}

/// In-memory catalog keyed by entity id.
#[derive(Default)]
pub struct MockCatalog {
    pub entities: HashMap<String, CatalogEntity>,
    pub children: HashMap<String, Vec<CatalogEntity>>,
    pub recent: Vec<Album>,
    pub fail_refresh: bool,
    pub refresh_count: Mutex<u32>,
}

impl MockCatalog {
    pub fn with_artist(mut self, artist: Artist, albums: Vec<Album>) -> Self {
        self.children.insert(
            artist.id.clone(),
            albums.iter().cloned().map(CatalogEntity::Album).collect(),
        );
        for album in albums {
            self.entities
                .insert(album.id.clone(), CatalogEntity::Album(album));
        }
        self.entities
            .insert(artist.id.clone(), CatalogEntity::Artist(artist));
        self
    }

    pub fn with_tracks(mut self, album_id: &str, tracks: Vec<Track>) -> Self {
        self.children.insert(
            album_id.to_string(),
            tracks.into_iter().map(CatalogEntity::Track).collect(),
        );
        self
    }

    pub fn refreshes(&self) -> u32 {
        *self.refresh_count.lock().unwrap()
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn search(&self, query: &str) -> Result<Option<ArtistHub>, CatalogError> {
        let artists: Vec<Artist> = self
            .entities
            .values()
            .filter_map(|e| match e {
                CatalogEntity::Artist(a) if a.title.contains(query) => Some(a.clone()),
                _ => None,
            })
            .collect();
        if artists.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ArtistHub { artists }))
        }
    }

    async fn fetch_by_id(&self, id: &str) -> Result<CatalogEntity, CatalogError> {
        self.entities
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn fetch_children(&self, id: &str) -> Result<Vec<CatalogEntity>, CatalogError> {
        self.children
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn refresh(&self) -> Result<(), CatalogError> {
        *self.refresh_count.lock().unwrap() += 1;
        if self.fail_refresh {
            return Err(CatalogError::Status {
                status: 500,
                path: "/library/sections/1/refresh".to_string(),
            });
        }
        Ok(())
    }

    async fn recently_added(&self, limit: u32) -> Result<Vec<Album>, CatalogError> {
        Ok(self.recent.iter().take(limit as usize).cloned().collect())
    }

    async fn find_artist_by_title(&self, title: &str) -> Result<Option<Artist>, CatalogError> {
        Ok(self.entities.values().find_map(|e| match e {
            CatalogEntity::Artist(a) if a.title == title => Some(a.clone()),
            _ => None,
        }))
    }

    async fn fetch_artwork(&self, thumb: &str) -> Result<Vec<u8>, CatalogError> {
        Ok(thumb.as_bytes().to_vec())
    }
}

pub fn artist(id: &str, title: &str) -> Artist {
    Artist {
        id: id.to_string(),
        title: title.to_string(),
        genres: vec!["Black Metal".to_string()],
        country: Some("Norway".to_string()),
        thumb: Some(format!("/library/metadata/{}/thumb", id)),
    }
}

pub fn album(id: &str, artist: &Artist, title: &str, year: i32) -> Album {
    Album {
        id: id.to_string(),
        artist_id: Some(artist.id.clone()),
        artist_title: Some(artist.title.clone()),
        title: title.to_string(),
        year: Some(year),
        genres: vec!["Black Metal".to_string()],
        thumb: Some(format!("/library/metadata/{}/thumb", id)),
    }
}

pub fn track(index: u32) -> Track {
    Track {
        id: format!("t{}", index),
        album_id: Some("a1".to_string()),
        index,
        title: format!("Song {}", index),
        duration_ms: 125000,
        file: Some(PathBuf::from(format!("/srv/music/A/2001 - B/{:02}.mp3", index))),
        performer: Some("A".to_string()),
    }
}
