//! Ordered, chunked publishing of a cover message followed by audio batches.

mod announcer;

pub use announcer::{AlbumAnnouncer, AnnounceError};

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::caption::track_listing;
use crate::catalog::Track;
use crate::transport::{ChatTarget, ChatTransport, MediaItem, MediaSource, TransportError};

/// Maximum number of audio items in one media batch.
pub const MEDIA_BATCH_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishStep {
    Cover,
    /// Zero-based batch index.
    Batch(usize),
}

impl std::fmt::Display for PublishStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStep::Cover => f.write_str("cover"),
            PublishStep::Batch(n) => write!(f, "batch {}", n),
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Transport failed at {step}: {source}")]
    TransportFailure {
        step: PublishStep,
        #[source]
        source: TransportError,
    },
}

/// The leading message of a post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoverInfo {
    /// Without an image the caption is sent as a plain text message.
    pub image: Option<MediaSource>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Size of each batch sent, in order.
    pub batches: Vec<usize>,
    /// Tracks left out because the catalog reported no file for them.
    pub skipped_tracks: usize,
}

pub struct Publisher {
    transport: Arc<dyn ChatTransport>,
}

impl Publisher {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Send the cover, then the tracks in batches of [`MEDIA_BATCH_SIZE`].
    ///
    /// Batches go out one at a time in track order; the first failing batch
    /// stops the rest. Nothing already sent is retracted.
    pub async fn publish(
        &self,
        target: &ChatTarget,
        cover: &CoverInfo,
        caption: &str,
        tracks: &[Track],
    ) -> Result<PublishReport, PublishError> {
        match &cover.image {
            Some(image) => {
                self.transport
                    .send_photo(target, image.clone(), Some(caption.to_string()))
                    .await
            }
            None => self.transport.send_text(target, caption, None).await,
        }
        .map_err(|source| PublishError::TransportFailure {
            step: PublishStep::Cover,
            source,
        })?;
        debug!("Cover sent to {}", target);

        self.publish_tracks(target, tracks).await
    }

    /// Send only the track batches. Each batch's first item carries the
    /// listing of that batch as its caption.
    pub async fn publish_tracks(
        &self,
        target: &ChatTarget,
        tracks: &[Track],
    ) -> Result<PublishReport, PublishError> {
        let playable: Vec<&Track> = tracks
            .iter()
            .filter(|track| {
                if track.file.is_none() {
                    warn!("Track {} ({}) has no file, skipping", track.id, track.title);
                }
                track.file.is_some()
            })
            .collect();

        let mut report = PublishReport {
            batches: Vec::new(),
            skipped_tracks: tracks.len() - playable.len(),
        };

        for (n, chunk) in playable.chunks(MEDIA_BATCH_SIZE).enumerate() {
            let owned: Vec<Track> = chunk.iter().map(|t| (*t).clone()).collect();
            let listing = track_listing(&owned).into_iter().next();

            let items: Vec<MediaItem> = owned
                .into_iter()
                .enumerate()
                .filter_map(|(i, track)| {
                    track.file.map(|file| MediaItem {
                        source: MediaSource::File(file),
                        caption: if i == 0 { listing.clone() } else { None },
                        title: Some(track.title),
                        performer: track.performer,
                    })
                })
                .collect();

            let size = items.len();
            self.transport
                .send_media_group(target, items)
                .await
                .map_err(|source| PublishError::TransportFailure {
                    step: PublishStep::Batch(n),
                    source,
                })?;
            debug!("Batch {} of {} tracks sent to {}", n, size, target);
            report.batches.push(size);
        }

        info!(
            "Published {} batches to {} ({} tracks skipped)",
            report.batches.len(),
            target,
            report.skipped_tracks
        );
        Ok(report)
    }
}
