//! Archive extraction, dispatched on the file extension.
//!
//! 7z, tar and zip go through the streaming codecs: extraction runs on the
//! blocking pool and reports completion over a oneshot channel. rar goes
//! through unrar, which hands back the list of extracted entries or fails.
//! Any other extension is passed through untouched.

use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Errors that can occur during extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("{format} codec failed on {path:?}: {message}")]
    CodecFailure {
        format: ArchiveFormat,
        path: PathBuf,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction of {0:?} ended without reporting completion")]
    Interrupted(PathBuf),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    SevenZip,
    Tar,
    Zip,
    Rar,
}

/// How an archive format reports its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Completion is signalled asynchronously once the codec finishes.
    Streaming,
    /// The codec returns the extracted entries, or fails.
    Listing,
}

impl ArchiveFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn detect(path: &Path) -> Result<Self, ExtractionError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "7z" => Ok(Self::SevenZip),
            "tar" => Ok(Self::Tar),
            "zip" => Ok(Self::Zip),
            "rar" => Ok(Self::Rar),
            _ => Err(ExtractionError::UnsupportedFormat(ext)),
        }
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        match self {
            Self::SevenZip | Self::Tar | Self::Zip => ExtractionStrategy::Streaming,
            Self::Rar => ExtractionStrategy::Listing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenZip => "7z",
            Self::Tar => "tar",
            Self::Zip => "zip",
            Self::Rar => "rar",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handing a file to the extractor.
#[derive(Debug, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The archive was unpacked. `entries` is only known for listing codecs.
    Extracted {
        format: ArchiveFormat,
        entries: Option<Vec<PathBuf>>,
    },
    /// Not an archive this extractor handles; the file was left as it is.
    Skipped,
}

#[derive(Clone, Debug, Default)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Unpack `archive` into `output_dir`.
    ///
    /// The archive itself is never touched here; removing it is the
    /// normalizer's job once extraction has succeeded.
    pub async fn extract(
        &self,
        archive: &Path,
        output_dir: &Path,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let format = match ArchiveFormat::detect(archive) {
            Ok(format) => format,
            Err(ExtractionError::UnsupportedFormat(ext)) => {
                debug!("Passing {:?} through, extension '{}' is not an archive", archive, ext);
                return Ok(ExtractionOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };

        tokio::fs::create_dir_all(output_dir).await?;
        info!("Extracting {} archive {:?} into {:?}", format, archive, output_dir);

        match format.strategy() {
            ExtractionStrategy::Streaming => {
                let completion = start_streaming(format, archive, output_dir);
                completion
                    .await
                    .map_err(|_| ExtractionError::Interrupted(archive.to_path_buf()))??;
                Ok(ExtractionOutcome::Extracted {
                    format,
                    entries: None,
                })
            }
            ExtractionStrategy::Listing => {
                let archive_path = archive.to_path_buf();
                let output = output_dir.to_path_buf();
                let entries =
                    tokio::task::spawn_blocking(move || extract_rar(&archive_path, &output))
                        .await
                        .map_err(|_| ExtractionError::Interrupted(archive.to_path_buf()))??;
                debug!("Extracted {} entries from {:?}", entries.len(), archive);
                Ok(ExtractionOutcome::Extracted {
                    format,
                    entries: Some(entries),
                })
            }
        }
    }
}

/// Start a streaming codec on the blocking pool. The receiver resolves once
/// the codec has finished.
fn start_streaming(
    format: ArchiveFormat,
    archive: &Path,
    output_dir: &Path,
) -> oneshot::Receiver<Result<(), ExtractionError>> {
    let (tx, rx) = oneshot::channel();
    let archive = archive.to_path_buf();
    let output_dir = output_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let result = run_streaming_codec(format, &archive, &output_dir);
        // The receiver is gone only if the caller stopped waiting.
        let _ = tx.send(result);
    });

    rx
}

fn run_streaming_codec(
    format: ArchiveFormat,
    archive: &Path,
    output_dir: &Path,
) -> Result<(), ExtractionError> {
    let codec_failure = |message: String| ExtractionError::CodecFailure {
        format,
        path: archive.to_path_buf(),
        message,
    };

    match format {
        ArchiveFormat::SevenZip => sevenz_rust::decompress_file(archive, output_dir)
            .map_err(|e| codec_failure(e.to_string())),
        ArchiveFormat::Tar => {
            let file = File::open(archive)?;
            tar::Archive::new(file)
                .unpack(output_dir)
                .map_err(|e| codec_failure(e.to_string()))
        }
        ArchiveFormat::Zip => {
            let file = File::open(archive)?;
            let mut zip = zip::ZipArchive::new(file).map_err(|e| codec_failure(e.to_string()))?;
            zip.extract(output_dir)
                .map_err(|e| codec_failure(e.to_string()))
        }
        ArchiveFormat::Rar => Err(ExtractionError::UnsupportedFormat(
            "rar is not a streaming format".to_string(),
        )),
    }
}

/// Extract a rar archive, returning the archive-relative paths of the files written.
fn extract_rar(archive: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut open = unrar::Archive::new(archive)
        .open_for_processing()
        .map_err(|e| rar_failure(archive, e))?;
    let mut entries = Vec::new();

    while let Some(header) = open.read_header().map_err(|e| rar_failure(archive, e))? {
        let entry = header.entry();
        open = if entry.is_file() {
            entries.push(entry.filename.clone());
            header.extract_with_base(output_dir)
        } else {
            header.skip()
        }
        .map_err(|e| rar_failure(archive, e))?;
    }

    Ok(entries)
}

fn rar_failure(archive: &Path, e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::CodecFailure {
        format: ArchiveFormat::Rar,
        path: archive.to_path_buf(),
        message: e.to_string(),
    }
}
