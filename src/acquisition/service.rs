//! Getting files onto local disk: direct downloads, chat attachments and
//! grouped audio submissions.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::naming::{filename_from_url, sanitize_component};
use super::tags::{placement_for, read_tags, AudioTags, Placement};
use super::AcquisitionError;
use crate::transport::{AudioAttachment, ChatTransport};

/// Staging folder under the holding directory for grouped audio in flight.
const STAGING_DIR: &str = ".incoming";

/// Where a single file comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcquisitionSource {
    Url(String),
    Attachment {
        file_id: String,
        file_name: Option<String>,
    },
}

impl AcquisitionSource {
    pub fn describe(&self) -> String {
        match self {
            AcquisitionSource::Url(url) => url.clone(),
            AcquisitionSource::Attachment { file_id, file_name } => {
                format!("attachment {} ({})", file_id, file_name.as_deref().unwrap_or("?"))
            }
        }
    }
}

/// Result of a grouped audio submission. Each file succeeds or fails on its own.
#[derive(Debug, Default)]
pub struct GroupedAcquisition {
    pub placed: Vec<Placement>,
    pub failed: Vec<(String, AcquisitionError)>,
}

impl GroupedAcquisition {
    pub fn library_count(&self) -> usize {
        self.placed
            .iter()
            .filter(|p| matches!(p, Placement::Library(_)))
            .count()
    }

    pub fn holding_count(&self) -> usize {
        self.placed.len() - self.library_count()
    }
}

pub struct AcquisitionService {
    http: reqwest::Client,
    transport: Arc<dyn ChatTransport>,
    music_root: PathBuf,
    holding_dir: PathBuf,
}

impl AcquisitionService {
    /// Downloads carry no overall timeout; archives can be large.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        music_root: PathBuf,
        holding_dir: PathBuf,
    ) -> Result<Self, AcquisitionError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AcquisitionError::Network(e.without_url()))?;
        Ok(Self {
            http,
            transport,
            music_root,
            holding_dir,
        })
    }

    pub fn music_root(&self) -> &Path {
        &self.music_root
    }

    /// Directory a submission for `artist` is downloaded and extracted into.
    pub fn artist_dir(&self, artist: &str) -> Result<PathBuf, AcquisitionError> {
        Ok(self.music_root.join(sanitize_component(artist)?))
    }

    /// Fetch one file into `<music_root>/<artist>/` and return its path.
    pub async fn acquire(
        &self,
        source: &AcquisitionSource,
        artist: &str,
    ) -> Result<PathBuf, AcquisitionError> {
        let artist_dir = self.artist_dir(artist)?;
        tokio::fs::create_dir_all(&artist_dir)
            .await
            .map_err(|source| AcquisitionError::Filesystem {
                path: artist_dir.clone(),
                source,
            })?;

        let (url, file_name) = match source {
            AcquisitionSource::Url(url) => (url.clone(), filename_from_url(url)?),
            AcquisitionSource::Attachment { file_id, file_name } => {
                let url = self.transport.resolve_attachment(file_id).await?;
                let file_name = match file_name {
                    Some(name) => sanitize_component(name)?,
                    None => filename_from_url(&url)?,
                };
                (url, file_name)
            }
        };

        let destination = artist_dir.join(file_name);
        info!("Acquiring {} into {:?}", source.describe(), destination);
        self.download(&url, &destination).await?;
        Ok(destination)
    }

    /// Fetch every audio attachment of a grouped submission and file it by
    /// its tags (see [`placement_for`]).
    pub async fn acquire_grouped_audio(
        &self,
        attachments: &[AudioAttachment],
    ) -> GroupedAcquisition {
        let mut outcome = GroupedAcquisition::default();

        for attachment in attachments {
            let label = attachment
                .file_name
                .clone()
                .unwrap_or_else(|| attachment.file_id.clone());
            match self.acquire_audio(attachment).await {
                Ok(placement) => {
                    debug!("Placed {} at {:?}", label, placement.path());
                    outcome.placed.push(placement);
                }
                Err(e) => {
                    warn!("Failed to acquire {}: {}", label, e);
                    outcome.failed.push((label, e));
                }
            }
        }

        info!(
            "Grouped submission: {} into library, {} held, {} failed",
            outcome.library_count(),
            outcome.holding_count(),
            outcome.failed.len()
        );
        outcome
    }

    async fn acquire_audio(
        &self,
        attachment: &AudioAttachment,
    ) -> Result<Placement, AcquisitionError> {
        let url = self.transport.resolve_attachment(&attachment.file_id).await?;
        let file_name = match &attachment.file_name {
            Some(name) => sanitize_component(name)?,
            None => filename_from_url(&url)?,
        };

        let staging_dir = self.holding_dir.join(STAGING_DIR);
        tokio::fs::create_dir_all(&staging_dir)
            .await
            .map_err(|source| AcquisitionError::Filesystem {
                path: staging_dir.clone(),
                source,
            })?;
        let staged = staging_dir.join(format!("{}-{}", uuid::Uuid::new_v4(), file_name));
        self.download(&url, &staged).await?;

        let tag_path = staged.clone();
        let tags = match tokio::task::spawn_blocking(move || read_tags(&tag_path)).await {
            Ok(Ok(tags)) => tags,
            Ok(Err(e)) => {
                warn!("{}", e);
                AudioTags::default()
            }
            Err(e) => {
                warn!("Tag reader task failed: {}", e);
                AudioTags::default()
            }
        };

        let placement = placement_for(
            &tags,
            Some(attachment),
            &file_name,
            &self.music_root,
            &self.holding_dir,
        )?;
        if let Err(e) = move_file(&staged, placement.path()).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(e);
        }
        Ok(placement)
    }

    /// Stream `url` into `destination`. Once the file has been created, a
    /// failure removes it again; anything already at `destination` survives
    /// a request that fails before the body arrives.
    async fn download(&self, url: &str, destination: &Path) -> Result<(), AcquisitionError> {
        // Attachment URLs embed the bot token, keep it out of error messages.
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AcquisitionError::Network(e.without_url()))?;

        let file = tokio::fs::File::create(destination)
            .await
            .map_err(|source| AcquisitionError::Filesystem {
                path: destination.to_path_buf(),
                source,
            })?;

        let result = write_body(response, file, destination).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(destination).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove partial download {:?}: {}", destination, e);
                }
            }
        }
        result
    }
}

async fn write_body(
    response: reqwest::Response,
    mut file: tokio::fs::File,
    destination: &Path,
) -> Result<(), AcquisitionError> {
    let fs_error = |source| AcquisitionError::Filesystem {
        path: destination.to_path_buf(),
        source,
    };

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AcquisitionError::Network(e.without_url()))?;
        file.write_all(&chunk).await.map_err(fs_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(fs_error)?;

    debug!("Downloaded {} bytes to {:?}", written, destination);
    Ok(())
}

/// Rename, falling back to copy and delete across filesystems.
async fn move_file(from: &Path, to: &Path) -> Result<(), AcquisitionError> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| AcquisitionError::Filesystem {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to)
        .await
        .map_err(|source| AcquisitionError::Filesystem {
            path: to.to_path_buf(),
            source,
        })?;
    tokio::fs::remove_file(from)
        .await
        .map_err(|source| AcquisitionError::Filesystem {
            path: from.to_path_buf(),
            source,
        })?;
    Ok(())
}
