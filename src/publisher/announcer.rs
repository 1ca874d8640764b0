//! Channel announcements built from catalog entities.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::{CoverInfo, PublishError, Publisher};
use crate::caption::CaptionComposer;
use crate::catalog::{Album, Catalog, CatalogError, Track};
use crate::transport::{ChatTarget, MediaSource};

#[derive(Debug, Error)]
pub enum AnnounceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

pub struct AlbumAnnouncer {
    catalog: Arc<dyn Catalog>,
    composer: CaptionComposer,
    publisher: Arc<Publisher>,
    channel: ChatTarget,
    attach_tracks: bool,
}

impl AlbumAnnouncer {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        composer: CaptionComposer,
        publisher: Arc<Publisher>,
        channel: ChatTarget,
        attach_tracks: bool,
    ) -> Self {
        Self {
            catalog,
            composer,
            publisher,
            channel,
            attach_tracks,
        }
    }

    pub fn channel(&self) -> &ChatTarget {
        &self.channel
    }

    /// Post one album: cover with caption, then its tracks if enabled.
    pub async fn announce_album(&self, album: &Album) -> Result<(), AnnounceError> {
        // Country lives on the artist, looked up by title within the section.
        let artist = match album.artist_title.as_deref() {
            Some(title) => self.catalog.find_artist_by_title(title).await?,
            None => None,
        };

        let caption = self.composer.album_caption(album, artist.as_ref());
        let cover = self.cover(album.thumb.as_deref()).await;
        let tracks: Vec<Track> = if self.attach_tracks {
            self.catalog.fetch_album_tracks(&album.id).await?
        } else {
            Vec::new()
        };

        self.publisher
            .publish(&self.channel, &cover, &caption, &tracks)
            .await?;
        info!("Announced album {} ({}) to {}", album.id, album.title, self.channel);
        Ok(())
    }

    pub async fn announce_by_id(&self, album_id: &str) -> Result<Album, AnnounceError> {
        let album = self.catalog.fetch_album(album_id).await?;
        self.announce_album(&album).await?;
        Ok(album)
    }

    /// Post the `limit` most recently added albums, newest first. Returns how
    /// many were posted.
    pub async fn announce_recent(&self, limit: u32) -> Result<usize, AnnounceError> {
        let albums = self.catalog.recently_added(limit).await?;
        for album in &albums {
            self.announce_album(album).await?;
        }
        Ok(albums.len())
    }

    /// Post the newest album, if the catalog has any.
    pub async fn announce_latest(&self) -> Result<Option<Album>, AnnounceError> {
        let Some(album) = self.catalog.recently_added(1).await?.into_iter().next() else {
            warn!("Catalog reported no recently added albums");
            return Ok(None);
        };
        self.announce_album(&album).await?;
        Ok(Some(album))
    }

    /// Post an artist with their albums grouped by release type.
    pub async fn announce_discography(&self, artist_id: &str) -> Result<(), AnnounceError> {
        let artist = self.catalog.fetch_artist(artist_id).await?;
        let albums = self.catalog.fetch_artist_albums(artist_id).await?;

        let caption = self.composer.discography_caption(&artist, &albums);
        let cover = self.cover(artist.thumb.as_deref()).await;
        self.publisher
            .publish(&self.channel, &cover, &caption, &[])
            .await?;
        info!(
            "Announced discography of {} ({} albums) to {}",
            artist.title,
            albums.len(),
            self.channel
        );
        Ok(())
    }

    /// Artwork is downloaded here and uploaded as bytes so the catalog
    /// credential never ends up in a URL handed to the chat service.
    async fn cover(&self, thumb: Option<&str>) -> CoverInfo {
        let Some(thumb) = thumb else {
            return CoverInfo::default();
        };
        match self.catalog.fetch_artwork(thumb).await {
            Ok(data) => CoverInfo {
                image: Some(MediaSource::Bytes {
                    file_name: "cover.jpg".to_string(),
                    data,
                }),
            },
            Err(e) => {
                warn!("Failed to fetch artwork {}: {}", thumb, e);
                CoverInfo::default()
            }
        }
    }
}
