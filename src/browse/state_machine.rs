//! Search, drill-down and delivery driven by callback tokens.
//!
//! ```text
//! Idle -> SearchResults -> ArtistView -> AlbumView -> DownloadModeSelected
//!                       \______________/
//! ```
//!
//! Nothing is remembered between steps; every token carries the id it acts
//! on and the catalog is asked again.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::token::{BrowseAction, CallbackToken, TokenError};
use crate::acquisition::{sanitize_component, AlbumPackager, PackagingError};
use crate::caption::{track_listing, CaptionComposer};
use crate::catalog::{Album, Catalog, CatalogError, Track};
use crate::publisher::{PublishError, Publisher};
use crate::transport::{Button, ChatTarget, ChatTransport, Keyboard, MediaSource, TransportError};

pub const ARCHIVE_BUTTON_LABEL: &str = "Download archive";
pub const TRACKS_BUTTON_LABEL: &str = "Download tracks";

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Packaging(#[from] PackagingError),

    #[error("No local files known for album {0}")]
    MissingAlbumDirectory(String),
}

/// Where a conversation ends up after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowseState {
    Idle,
    SearchResults,
    ArtistView,
    AlbumView,
    DownloadModeSelected,
}

/// A rendered step: HTML text plus its buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowseView {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

pub struct BrowseStateMachine {
    catalog: Arc<dyn Catalog>,
    transport: Arc<dyn ChatTransport>,
    publisher: Arc<Publisher>,
    packager: AlbumPackager,
    composer: CaptionComposer,
}

impl BrowseStateMachine {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        transport: Arc<dyn ChatTransport>,
        publisher: Arc<Publisher>,
        packager: AlbumPackager,
        composer: CaptionComposer,
    ) -> Self {
        Self {
            catalog,
            transport,
            publisher,
            packager,
            composer,
        }
    }

    /// Search artists and offer one button per hit.
    pub async fn search(&self, chat: &ChatTarget, query: &str) -> Result<BrowseState, BrowseError> {
        let artists = self
            .catalog
            .search(query)
            .await?
            .map(|hub| hub.artists)
            .unwrap_or_default();

        if artists.is_empty() {
            let text = format!("Nothing found for {}", teloxide::utils::html::escape(query));
            self.transport.send_text(chat, &text, None).await?;
            return Ok(BrowseState::Idle);
        }

        let buttons = artists
            .iter()
            .map(|artist| {
                let payload = CallbackToken::new(BrowseAction::ArtistById, &artist.id).encode()?;
                Ok(Button::new(&artist.title, payload))
            })
            .collect::<Result<Vec<_>, TokenError>>()?;

        debug!("Search '{}' returned {} artists", query, buttons.len());
        self.send_view(
            chat,
            BrowseView {
                text: format!("Artists matching {}:", teloxide::utils::html::escape(query)),
                keyboard: Some(Keyboard::column(buttons)),
            },
        )
        .await?;
        Ok(BrowseState::SearchResults)
    }

    /// Act on a pressed button.
    pub async fn handle_token(&self, chat: &ChatTarget, raw: &str) -> Result<BrowseState, BrowseError> {
        let token = CallbackToken::decode(raw)?;
        debug!("Browse token {:?} from {}", token, chat);

        match token.action {
            BrowseAction::ArtistById => {
                let view = self.artist_view(&token.primary_id).await?;
                self.send_view(chat, view).await?;
                Ok(BrowseState::ArtistView)
            }
            BrowseAction::AlbumById => {
                for view in self.album_view(&token.primary_id).await? {
                    self.send_view(chat, view).await?;
                }
                Ok(BrowseState::AlbumView)
            }
            BrowseAction::DownloadArchive => {
                self.deliver_archive(chat, &token.primary_id).await?;
                Ok(BrowseState::DownloadModeSelected)
            }
            BrowseAction::DownloadSong => {
                self.deliver_tracks(chat, &token.primary_id, token.secondary_id.as_deref())
                    .await?;
                Ok(BrowseState::DownloadModeSelected)
            }
        }
    }

    /// Artist header, classified albums and one button per album.
    pub async fn artist_view(&self, artist_id: &str) -> Result<BrowseView, BrowseError> {
        let artist = self.catalog.fetch_artist(artist_id).await?;
        let albums = self.catalog.fetch_artist_albums(artist_id).await?;

        let buttons = albums
            .iter()
            .map(|album| {
                let payload = CallbackToken::new(BrowseAction::AlbumById, &album.id).encode()?;
                Ok(Button::new(album_label(album), payload))
            })
            .collect::<Result<Vec<_>, TokenError>>()?;

        Ok(BrowseView {
            text: self.composer.discography_caption(&artist, &albums),
            keyboard: Some(Keyboard::column(buttons)),
        })
    }

    /// Album caption and track listing, one message per listing chunk. The
    /// first message carries the caption, the last one the two delivery
    /// buttons.
    pub async fn album_view(&self, album_id: &str) -> Result<Vec<BrowseView>, BrowseError> {
        let album = self.catalog.fetch_album(album_id).await?;
        let tracks = self.catalog.fetch_album_tracks(album_id).await?;

        let mut pages = track_listing(&tracks).into_iter();
        let mut text = self.composer.album_caption(&album, None);
        if let Some(first) = pages.next() {
            text.push_str("\n\n");
            text.push_str(&first);
        }
        let mut views: Vec<BrowseView> = std::iter::once(text)
            .chain(pages)
            .map(|text| BrowseView {
                text,
                keyboard: None,
            })
            .collect();

        let keyboard = Keyboard::row(vec![
            Button::new(
                ARCHIVE_BUTTON_LABEL,
                CallbackToken::new(BrowseAction::DownloadArchive, &album.id).encode()?,
            ),
            Button::new(
                TRACKS_BUTTON_LABEL,
                CallbackToken::new(BrowseAction::DownloadSong, &album.id).encode()?,
            ),
        ]);

        if let Some(last) = views.last_mut() {
            last.keyboard = Some(keyboard);
        }
        Ok(views)
    }

    /// Zip the album's folder, send it, and always remove the zip afterwards.
    async fn deliver_archive(&self, chat: &ChatTarget, album_id: &str) -> Result<(), BrowseError> {
        let album = self.catalog.fetch_album(album_id).await?;
        let tracks = self.catalog.fetch_album_tracks(album_id).await?;

        let album_dir = album_directory(&tracks)
            .ok_or_else(|| BrowseError::MissingAlbumDirectory(album_id.to_string()))?;

        let name = sanitize_component(&album.title).unwrap_or_else(|_| album.id.clone());
        let artifact = self.packager.package(&album_dir, &name).await?;

        let sent = self
            .transport
            .send_document(chat, MediaSource::File(artifact.clone()))
            .await;
        self.packager.discard(&artifact).await;
        sent?;

        info!("Sent album {} as archive to {}", album.id, chat);
        Ok(())
    }

    /// Send the album's tracks as audio batches. With a track id only that
    /// track is sent.
    async fn deliver_tracks(
        &self,
        chat: &ChatTarget,
        album_id: &str,
        track_id: Option<&str>,
    ) -> Result<(), BrowseError> {
        let tracks = self.catalog.fetch_album_tracks(album_id).await?;
        let selected: Vec<Track> = match track_id {
            Some(id) => {
                let selected: Vec<Track> = tracks.into_iter().filter(|t| t.id == id).collect();
                if selected.is_empty() {
                    let what = format!("track {} of album {}", id, album_id);
                    return Err(CatalogError::NotFound(what).into());
                }
                selected
            }
            None => tracks,
        };

        let report = self.publisher.publish_tracks(chat, &selected).await?;
        info!(
            "Sent album {} as {} batches to {}",
            album_id,
            report.batches.len(),
            chat
        );
        Ok(())
    }

    async fn send_view(&self, chat: &ChatTarget, view: BrowseView) -> Result<(), BrowseError> {
        self.transport
            .send_text(chat, &view.text, view.keyboard)
            .await?;
        Ok(())
    }
}

/// Deepest directory holding every track file, so multi-disc albums are
/// packaged whole.
fn album_directory(tracks: &[Track]) -> Option<PathBuf> {
    let mut parents = tracks
        .iter()
        .filter_map(|track| track.file.as_deref().and_then(Path::parent));
    let mut common = parents.next()?.to_path_buf();
    for parent in parents {
        while !parent.starts_with(&common) {
            if !common.pop() {
                return None;
            }
        }
    }
    Some(common)
}

fn album_label(album: &Album) -> String {
    match album.year {
        Some(year) => format!("{} ({})", album.title, year),
        None => album.title.clone(),
    }
}
