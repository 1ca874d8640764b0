//! Post-extraction cleanup: album directories become world-readable and the
//! source archive is removed.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Permission bits applied to each first-level album directory.
pub const ALBUM_DIR_MODE: u32 = 0o755;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Failed to list {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to set permissions on {path:?}: {source}")]
    Permissions {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove archive {path:?}: {source}")]
    RemoveArchive {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// First-level directories whose mode was set.
    pub directories: Vec<PathBuf>,
    pub archive_removed: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FilesystemNormalizer;

impl FilesystemNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Set [`ALBUM_DIR_MODE`] on every directory directly under `output_dir`,
    /// then delete `source_archive`. Nested directories and files are left
    /// with whatever mode the extractor gave them.
    pub async fn normalize(
        &self,
        output_dir: &Path,
        source_archive: &Path,
    ) -> Result<NormalizeReport, NormalizeError> {
        let mut report = NormalizeReport::default();

        let mut entries =
            tokio::fs::read_dir(output_dir)
                .await
                .map_err(|source| NormalizeError::ReadDir {
                    path: output_dir.to_path_buf(),
                    source,
                })?;

        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|source| NormalizeError::ReadDir {
                    path: output_dir.to_path_buf(),
                    source,
                })?;
            let Some(entry) = entry else { break };

            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|source| NormalizeError::ReadDir {
                    path: path.clone(),
                    source,
                })?;
            if !file_type.is_dir() {
                continue;
            }

            set_album_dir_mode(&path).await?;
            debug!("Set mode {:o} on {:?}", ALBUM_DIR_MODE, path);
            report.directories.push(path);
        }

        report.archive_removed = match tokio::fs::remove_file(source_archive).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(source) => {
                return Err(NormalizeError::RemoveArchive {
                    path: source_archive.to_path_buf(),
                    source,
                })
            }
        };

        info!(
            "Normalized {} album directories under {:?}, archive removed: {}",
            report.directories.len(),
            output_dir,
            report.archive_removed
        );
        Ok(report)
    }
}

#[cfg(unix)]
async fn set_album_dir_mode(path: &Path) -> Result<(), NormalizeError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(ALBUM_DIR_MODE))
        .await
        .map_err(|source| NormalizeError::Permissions {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
async fn set_album_dir_mode(_path: &Path) -> Result<(), NormalizeError> {
    Ok(())
}
