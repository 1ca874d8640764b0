//! Acquisition job record and its lifecycle.

use std::path::PathBuf;
use tracing::debug;

use crate::acquisition::AcquisitionSource;
use crate::transport::ChatTarget;

/// Lifecycle of an acquisition job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, nothing fetched yet.
    Pending,
    Downloading,
    Extracting,
    /// Fixing directory modes and removing the archive.
    Normalizing,
    CatalogRefreshing,
    /// Finished. Also the end state of passthrough files.
    Published,
    /// Failed at some stage (non-recoverable).
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Downloading => "DOWNLOADING",
            Self::Extracting => "EXTRACTING",
            Self::Normalizing => "NORMALIZING",
            Self::CatalogRefreshing => "CATALOG_REFRESHING",
            Self::Published => "PUBLISHED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a job was created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    /// One archive or file, from a link or a document.
    Single(AcquisitionSource),
    /// A grouped audio submission, keyed by its media group id.
    AudioGroup { group_id: String, files: usize },
}

/// Ephemeral record owned by the handler of one submission. Never persisted.
#[derive(Debug, Clone)]
pub struct AcquisitionJob {
    pub id: String,
    pub source: JobSource,
    pub artist: Option<String>,
    /// Local path of the acquired file, once known.
    pub destination: Option<PathBuf>,
    pub state: JobState,
    pub requested_by: ChatTarget,
}

impl AcquisitionJob {
    pub fn single(source: AcquisitionSource, artist: String, requested_by: ChatTarget) -> Self {
        Self::new(JobSource::Single(source), Some(artist), requested_by)
    }

    pub fn audio_group(group_id: String, files: usize, requested_by: ChatTarget) -> Self {
        Self::new(JobSource::AudioGroup { group_id, files }, None, requested_by)
    }

    fn new(source: JobSource, artist: Option<String>, requested_by: ChatTarget) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source,
            artist,
            destination: None,
            state: JobState::Pending,
            requested_by,
        }
    }

    /// Move to `next`. Terminal states are final; later transitions are ignored.
    pub fn transition(&mut self, next: JobState) {
        if self.state.is_terminal() {
            debug!(
                "Job {} is {}, ignoring transition to {}",
                self.id, self.state, next
            );
            return;
        }
        debug!("Job {}: {} -> {}", self.id, self.state, next);
        self.state = next;
    }
}
