//! Bundling an album directory into a single zip for delivery.

use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("Album directory {0:?} does not exist")]
    MissingDirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk {path:?}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Zip error: {0}")]
    Zip(String),

    #[error("Packaging task failed: {0}")]
    Task(String),
}

impl From<zip::result::ZipError> for PackagingError {
    fn from(e: zip::result::ZipError) -> Self {
        PackagingError::Zip(e.to_string())
    }
}

/// Produces temporary zip artifacts in `work_dir`.
#[derive(Clone, Debug)]
pub struct AlbumPackager {
    work_dir: PathBuf,
}

impl AlbumPackager {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Zip `album_dir` into `<work_dir>/<archive_name>.zip`. Entries are rooted
    /// at the album folder's own name. Audio is stored, not deflated.
    pub async fn package(
        &self,
        album_dir: &Path,
        archive_name: &str,
    ) -> Result<PathBuf, PackagingError> {
        if !tokio::fs::try_exists(album_dir).await.unwrap_or(false) {
            return Err(PackagingError::MissingDirectory(album_dir.to_path_buf()));
        }
        tokio::fs::create_dir_all(&self.work_dir).await?;

        let artifact = self
            .work_dir
            .join(format!("{}-{}.zip", archive_name, uuid::Uuid::new_v4()));
        let source = album_dir.to_path_buf();
        let target = artifact.clone();

        let result = tokio::task::spawn_blocking(move || write_zip(&source, &target))
            .await
            .map_err(|e| PackagingError::Task(e.to_string()))?;

        if let Err(e) = result {
            self.discard(&artifact).await;
            return Err(e);
        }

        debug!("Packaged {:?} into {:?}", album_dir, artifact);
        Ok(artifact)
    }

    /// Remove an artifact. Failures are logged, never returned.
    pub async fn discard(&self, artifact: &Path) {
        match tokio::fs::remove_file(artifact).await {
            Ok(()) => debug!("Removed artifact {:?}", artifact),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove artifact {:?}: {}", artifact, e),
        }
    }
}

fn write_zip(album_dir: &Path, artifact: &Path) -> Result<(), PackagingError> {
    let root = album_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| album_dir.to_path_buf());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut writer = zip::ZipWriter::new(File::create(artifact)?);

    for entry in WalkDir::new(album_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| PackagingError::Walk {
            path: album_dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(&root)
            .map_err(|e| PackagingError::Walk {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            })?;
        // Zip entry names always use forward slashes
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            std::io::copy(&mut file, &mut writer)?;
        }
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_package_album_directory() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("music/Burzum/1996 - Filosofem");
        std::fs::create_dir_all(album.join("scans")).unwrap();
        std::fs::write(album.join("01.mp3"), b"one").unwrap();
        std::fs::write(album.join("scans/front.jpg"), b"jpg").unwrap();
        let packager = AlbumPackager::new(temp_dir.path().join("work"));

        let artifact = packager.package(&album, "Filosofem").await.unwrap();

        assert!(artifact.starts_with(temp_dir.path().join("work")));
        let mut zip = zip::ZipArchive::new(File::open(&artifact).unwrap()).unwrap();
        let mut names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert!(names.contains(&"1996 - Filosofem/01.mp3".to_string()));
        assert!(names.contains(&"1996 - Filosofem/scans/front.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_discard_removes_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("Album");
        std::fs::create_dir_all(&album).unwrap();
        std::fs::write(album.join("01.mp3"), b"one").unwrap();
        let packager = AlbumPackager::new(temp_dir.path().join("work"));

        let artifact = packager.package(&album, "Album").await.unwrap();
        packager.discard(&artifact).await;

        assert!(!artifact.exists());
        // Discarding twice is harmless
        packager.discard(&artifact).await;
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let packager = AlbumPackager::new(temp_dir.path());

        let result = packager.package(&temp_dir.path().join("nope"), "x").await;

        assert!(matches!(result, Err(PackagingError::MissingDirectory(_))));
    }
}
