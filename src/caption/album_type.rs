//! Release classification from album titles.
//!
//! The catalog exposes no release-type field for albums, so the type is
//! inferred from markers in the title. Rules are checked in priority order
//! with a case-sensitive substring match and the first hit wins; a title
//! with no marker is a full-length release.

use lazy_static::lazy_static;
use regex::Regex;

/// Album type classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlbumType {
    FullLength,
    Ep,
    Single,
    Demo,
    Live,
    Instrumental,
    Remixes,
    Reissue,
}

/// Classification rules in priority order.
const CLASSIFICATION_RULES: [(AlbumType, &str); 7] = [
    (AlbumType::Ep, "EP"),
    (AlbumType::Single, "Single"),
    (AlbumType::Demo, "Demo"),
    (AlbumType::Live, "Live"),
    (AlbumType::Instrumental, "Instrumental"),
    (AlbumType::Remixes, "Remix"),
    (AlbumType::Reissue, "Reissue"),
];

lazy_static! {
    /// A bracketed group containing a rule's marker, e.g. " (Single)" or " [EP]".
    static ref MARKER_GROUPS: Vec<(AlbumType, Regex)> = CLASSIFICATION_RULES
        .iter()
        .map(|(album_type, marker)| {
            let pattern = format!(r"\s*[\(\[][^\)\]]*{}[^\)\]]*[\)\]]", regex::escape(marker));
            // Markers are literal and escaped, the pattern is always valid.
            (*album_type, Regex::new(&pattern).unwrap())
        })
        .collect();
}

impl AlbumType {
    /// Order in which sections are rendered.
    pub const DISPLAY_ORDER: [AlbumType; 8] = [
        AlbumType::FullLength,
        AlbumType::Ep,
        AlbumType::Single,
        AlbumType::Demo,
        AlbumType::Live,
        AlbumType::Instrumental,
        AlbumType::Remixes,
        AlbumType::Reissue,
    ];

    /// Classify an album by its title.
    pub fn classify(title: &str) -> Self {
        CLASSIFICATION_RULES
            .iter()
            .find(|(_, marker)| title.contains(marker))
            .map(|(album_type, _)| *album_type)
            .unwrap_or(AlbumType::FullLength)
    }

    /// Heading of this type's section in a discography.
    pub fn section_title(&self) -> &'static str {
        match self {
            AlbumType::FullLength => "Full-Length",
            AlbumType::Ep => "EPs",
            AlbumType::Single => "Singles",
            AlbumType::Demo => "Demos",
            AlbumType::Live => "Live",
            AlbumType::Instrumental => "Instrumentals",
            AlbumType::Remixes => "Remixes",
            AlbumType::Reissue => "Reissues",
        }
    }

    /// The title with the bracketed marker that produced this type removed.
    ///
    /// Unbracketed markers are part of the name ("Live at Wacken") and stay.
    pub fn display_title(&self, title: &str) -> String {
        let Some((_, pattern)) = MARKER_GROUPS.iter().find(|(t, _)| t == self) else {
            return title.to_string();
        };

        let stripped = pattern.replace(title, "");
        let stripped = stripped.trim();
        if stripped.is_empty() {
            title.to_string()
        } else {
            stripped.to_string()
        }
    }
}
