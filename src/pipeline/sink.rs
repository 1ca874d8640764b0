//! Pipeline-level error reporting.
//!
//! Every stage failure ends up here, tagged with the stage it came from.

use std::sync::Mutex;
use thiserror::Error;
use tracing::error;

use super::job::AcquisitionJob;
use crate::acquisition::AcquisitionError;
use crate::archive::{ExtractionError, NormalizeError};
use crate::catalog::CatalogError;
use crate::publisher::AnnounceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Acquisition,
    Extraction,
    Normalization,
    Refresh,
    Publish,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acquisition => "acquisition",
            Self::Extraction => "extraction",
            Self::Normalization => "normalization",
            Self::Refresh => "refresh",
            Self::Publish => "publish",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Normalization failed: {0}")]
    Normalization(#[from] NormalizeError),

    #[error("Catalog refresh failed: {0}")]
    Refresh(#[from] CatalogError),

    #[error("Announcement failed: {0}")]
    Announcement(#[from] AnnounceError),
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Acquisition(_) => PipelineStage::Acquisition,
            Self::Extraction(_) => PipelineStage::Extraction,
            Self::Normalization(_) => PipelineStage::Normalization,
            Self::Refresh(_) => PipelineStage::Refresh,
            Self::Announcement(_) => PipelineStage::Publish,
        }
    }
}

/// Destination of stage failures.
pub trait ErrorSink: Send + Sync {
    fn report(&self, job: &AcquisitionJob, error: &PipelineError);
}

/// Logs failures through `tracing`.
#[derive(Debug, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, job: &AcquisitionJob, err: &PipelineError) {
        error!(
            "Job {} failed at {} ({:?}): {}",
            job.id,
            err.stage(),
            job.source,
            err
        );
    }
}

/// Keeps failures in memory, for inspection.
#[derive(Debug, Default)]
pub struct MemoryErrorSink {
    reports: Mutex<Vec<(String, PipelineStage, String)>>,
}

impl MemoryErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(job id, stage, message)` in report order.
    pub fn reports(&self) -> Vec<(String, PipelineStage, String)> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<PipelineStage> {
        self.reports().into_iter().map(|(_, stage, _)| stage).collect()
    }
}

impl ErrorSink for MemoryErrorSink {
    fn report(&self, job: &AcquisitionJob, err: &PipelineError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push((job.id.clone(), err.stage(), err.to_string()));
        }
    }
}
