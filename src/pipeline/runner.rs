//! The ingestion pipeline: acquire, extract, normalize, refresh, announce.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::job::{AcquisitionJob, JobSource, JobState};
use super::sink::{ErrorSink, PipelineError, PipelineStage};
use crate::acquisition::{AcquisitionError, AcquisitionService, GroupedAcquisition};
use crate::archive::{ArchiveExtractor, ExtractionOutcome, FilesystemNormalizer};
use crate::catalog::Catalog;
use crate::publisher::AlbumAnnouncer;
use crate::transport::{AudioAttachment, ChatTransport};

pub const UNPACKED_ACK: &str = "Downloaded and unpacked";

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Ran to the end. `announced` is the album id posted to the channel.
    Published { announced: Option<String> },
    /// Not an archive; the file was stored as it came.
    PassedThrough(PathBuf),
    Failed(PipelineStage),
}

pub struct IngestionPipeline {
    acquisition: Arc<AcquisitionService>,
    extractor: ArchiveExtractor,
    normalizer: FilesystemNormalizer,
    catalog: Arc<dyn Catalog>,
    transport: Arc<dyn ChatTransport>,
    announcer: Arc<AlbumAnnouncer>,
    sink: Arc<dyn ErrorSink>,
    refresh_settle: Duration,
}

impl IngestionPipeline {
    pub fn new(
        acquisition: Arc<AcquisitionService>,
        catalog: Arc<dyn Catalog>,
        transport: Arc<dyn ChatTransport>,
        announcer: Arc<AlbumAnnouncer>,
        sink: Arc<dyn ErrorSink>,
        refresh_settle: Duration,
    ) -> Self {
        Self {
            acquisition,
            extractor: ArchiveExtractor::new(),
            normalizer: FilesystemNormalizer::new(),
            catalog,
            transport,
            announcer,
            sink,
            refresh_settle,
        }
    }

    /// Run a single-file job through every stage.
    ///
    /// The user hears about download failures and gets an acknowledgement
    /// once the archive is unpacked. Extraction, refresh and announcement
    /// failures only reach the error sink.
    pub async fn run_archive(&self, job: &mut AcquisitionJob) -> JobOutcome {
        info!("Job {} started: {:?}", job.id, job.source);

        // Acquisition
        let JobSource::Single(source) = job.source.clone() else {
            let err = AcquisitionError::InvalidInput("not a single-file job".to_string());
            return self.fail(job, err.into());
        };
        let artist = job.artist.clone().unwrap_or_default();
        job.transition(JobState::Downloading);
        let file = match self.acquisition.acquire(&source, &artist).await {
            Ok(file) => file,
            Err(e) => {
                self.reply(job, &format!("Download failed: {}", e)).await;
                return self.fail(job, e.into());
            }
        };
        job.destination = Some(file.clone());
        let output_dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.acquisition.music_root().to_path_buf());

        // Extraction
        job.transition(JobState::Extracting);
        match self.extractor.extract(&file, &output_dir).await {
            Ok(ExtractionOutcome::Extracted { format, .. }) => {
                info!("Job {}: {} archive extracted", job.id, format);
            }
            Ok(ExtractionOutcome::Skipped) => {
                info!("Job {}: {:?} is not an archive, left as is", job.id, file);
                job.transition(JobState::Published);
                return JobOutcome::PassedThrough(file);
            }
            Err(e) => return self.fail(job, e.into()),
        }

        // Normalization
        job.transition(JobState::Normalizing);
        if let Err(e) = self.normalizer.normalize(&output_dir, &file).await {
            return self.fail(job, e.into());
        }
        self.reply(job, UNPACKED_ACK).await;

        // Refresh
        job.transition(JobState::CatalogRefreshing);
        if let Err(e) = self.catalog.refresh().await {
            return self.fail(job, e.into());
        }

        // Announcement, once the catalog had time to pick the files up
        tokio::time::sleep(self.refresh_settle).await;
        match self.announcer.announce_latest().await {
            Ok(album) => {
                job.transition(JobState::Published);
                info!("Job {} published", job.id);
                JobOutcome::Published {
                    announced: album.map(|a| a.id),
                }
            }
            Err(e) => self.fail(job, e.into()),
        }
    }

    /// Acquire every file of a grouped audio submission, refresh the catalog
    /// when something landed in the library, and reply with a summary.
    pub async fn run_grouped_audio(
        &self,
        job: &mut AcquisitionJob,
        attachments: &[AudioAttachment],
    ) -> JobOutcome {
        info!("Job {} started: {} grouped audio files", job.id, attachments.len());

        job.transition(JobState::Downloading);
        let outcome = self.acquisition.acquire_grouped_audio(attachments).await;
        let summary = grouped_summary(&outcome);
        let library_count = outcome.library_count();
        let placed_count = outcome.placed.len();
        for (_, e) in outcome.failed {
            self.sink.report(job, &PipelineError::Acquisition(e));
        }
        self.reply(job, &summary).await;

        if placed_count == 0 {
            job.transition(JobState::Failed);
            return JobOutcome::Failed(PipelineStage::Acquisition);
        }

        if library_count > 0 {
            job.transition(JobState::CatalogRefreshing);
            if let Err(e) = self.catalog.refresh().await {
                return self.fail(job, e.into());
            }
        }

        job.transition(JobState::Published);
        JobOutcome::Published { announced: None }
    }

    fn fail(&self, job: &mut AcquisitionJob, err: PipelineError) -> JobOutcome {
        self.sink.report(job, &err);
        job.transition(JobState::Failed);
        JobOutcome::Failed(err.stage())
    }

    async fn reply(&self, job: &AcquisitionJob, text: &str) {
        if let Err(e) = self.transport.send_text(&job.requested_by, text, None).await {
            warn!("Job {}: failed to reply to {}: {}", job.id, job.requested_by, e);
        }
    }
}

fn grouped_summary(outcome: &GroupedAcquisition) -> String {
    let mut summary = format!(
        "{} file(s) added to the library, {} held for sorting",
        outcome.library_count(),
        outcome.holding_count()
    );
    if !outcome.failed.is_empty() {
        let names: Vec<&str> = outcome.failed.iter().map(|(name, _)| name.as_str()).collect();
        summary.push_str(&format!(
            ", {} failed: {}",
            outcome.failed.len(),
            teloxide::utils::html::escape(&names.join(", "))
        ));
    }
    summary
}
