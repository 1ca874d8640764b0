//! Embedded audio tags and the library placement derived from them.

use lofty::{Accessor, ItemKey, Probe, TaggedFileExt};
use std::path::{Path, PathBuf};

use super::naming::sanitize_component;
use super::AcquisitionError;
use crate::transport::AudioAttachment;

/// Performer folder used in the holding directory when nothing names one.
pub const UNKNOWN_PERFORMER: &str = "Unknown Artist";

/// The tag fields placement cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioTags {
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub title: Option<String>,
}

impl AudioTags {
    /// Album artist when tagged, otherwise the track artist.
    pub fn performer(&self) -> Option<&str> {
        self.album_artist
            .as_deref()
            .or(self.artist.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Read tags from an audio file. Blocking; call from the blocking pool.
pub fn read_tags(path: &Path) -> Result<AudioTags, AcquisitionError> {
    let tagged_file = Probe::open(path)
        .map_err(|e| AcquisitionError::Tags(format!("Failed to open {:?}: {}", path, e)))?
        .read()
        .map_err(|e| AcquisitionError::Tags(format!("Failed to read {:?}: {}", path, e)))?;

    let Some(tag) = tagged_file.primary_tag().or(tagged_file.first_tag()) else {
        return Ok(AudioTags::default());
    };

    Ok(AudioTags {
        artist: tag.artist().map(|s| s.to_string()),
        album_artist: tag.get_string(&ItemKey::AlbumArtist).map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
        year: tag.year(),
        title: tag.title().map(|s| s.to_string()),
    })
}

/// Where an acquired audio file ends up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// `<music_root>/<artist>/<year> - <album>/<file>`
    Library(PathBuf),
    /// `<holding_dir>/<performer>/<file>`, outside the catalog's view.
    Holding(PathBuf),
}

impl Placement {
    pub fn path(&self) -> &Path {
        match self {
            Placement::Library(path) | Placement::Holding(path) => path,
        }
    }
}

/// Decide the destination of one file of a grouped submission.
///
/// Files whose tags name an artist, an album and a year go straight into the
/// library. Everything else is held back, keyed by whichever performer the
/// tags or the chat attachment provide.
pub fn placement_for(
    tags: &AudioTags,
    attachment: Option<&AudioAttachment>,
    file_name: &str,
    music_root: &Path,
    holding_dir: &Path,
) -> Result<Placement, AcquisitionError> {
    let file_name = sanitize_component(file_name)?;

    let library_dir = match (tags.performer(), tags.album.as_deref(), tags.year) {
        (Some(artist), Some(album), Some(year)) => {
            match (
                sanitize_component(artist),
                sanitize_component(&format!("{} - {}", year, album.trim())),
            ) {
                (Ok(artist), Ok(album_dir)) => Some(music_root.join(artist).join(album_dir)),
                _ => None,
            }
        }
        _ => None,
    };

    if let Some(dir) = library_dir {
        return Ok(Placement::Library(dir.join(file_name)));
    }

    let performer = tags
        .performer()
        .or(attachment.and_then(|a| a.performer.as_deref()))
        .and_then(|p| sanitize_component(p).ok())
        .unwrap_or_else(|| UNKNOWN_PERFORMER.to_string());

    Ok(Placement::Holding(holding_dir.join(performer).join(file_name)))
}
