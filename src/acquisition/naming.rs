//! Names derived from user input: direct links, URL file names and artist
//! names guessed from attachment file names.

use std::path::Path;

use super::AcquisitionError;

/// Separator between artist and URL in a direct-link message.
pub const DIRECT_LINK_SEPARATOR: &str = "__";

/// Separators tried, in order, when guessing an artist from a file name.
const ARTIST_SEPARATORS: [&str; 7] = [" - ", "–", "—", "_", "(", "[", "-"];

/// `"<artist>__<url>"`, as typed by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectLink {
    pub artist: String,
    pub url: String,
}

impl DirectLink {
    /// Parse a direct-link message. `None` when the text does not have the
    /// shape; the artist part is sanitized into a single path component.
    pub fn parse(text: &str) -> Option<Self> {
        let (artist, url) = text.trim().split_once(DIRECT_LINK_SEPARATOR)?;
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return None;
        }
        let artist = sanitize_component(artist.trim()).ok()?;
        Some(Self {
            artist,
            url: url.to_string(),
        })
    }
}

/// File name from the last path segment of a URL, percent-decoded and
/// sanitized. Query and fragment are ignored.
pub fn filename_from_url(url: &str) -> Result<String, AcquisitionError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| AcquisitionError::InvalidInput(format!("Invalid URL {}: {}", url, e)))?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AcquisitionError::InvalidInput(format!("No file name in URL {}", url)))?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    sanitize_component(&decoded)
}

/// Guess the artist from an attachment file name: the text before the first
/// separator that has something in front of it, or the whole stem.
pub fn artist_from_filename(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    for separator in ARTIST_SEPARATORS {
        if let Some((prefix, _)) = stem.split_once(separator) {
            let prefix = prefix.trim();
            if !prefix.is_empty() {
                return prefix.to_string();
            }
        }
    }
    stem.trim().to_string()
}

/// Reduce user-supplied text to a single safe path component.
pub fn sanitize_component(name: &str) -> Result<String, AcquisitionError> {
    let name = name.trim();

    // Null bytes, hidden files and parent references are never allowed
    if name.is_empty() || name.contains('\0') || name.starts_with('.') {
        return Err(AcquisitionError::InvalidInput(format!(
            "Unsafe name: {:?}",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    Ok(sanitized)
}
