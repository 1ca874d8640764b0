//! HTML captions for channel posts and browse views.

use teloxide::utils::html;

use super::album_type::AlbumType;
use crate::catalog::{Album, Artist, Track};

/// Maximum number of entries rendered into one track-listing block. Matches
/// the size of a media batch so each batch carries its own listing.
pub const TRACK_LISTING_CHUNK: usize = 10;

/// Renders catalog entities into Telegram-flavoured HTML.
#[derive(Clone, Debug)]
pub struct CaptionComposer {
    web_url: String,
}

impl CaptionComposer {
    /// `web_url` is the catalog's web UI root; entity links are built under it.
    pub fn new(web_url: impl Into<String>) -> Self {
        let web_url: String = web_url.into();
        Self {
            web_url: web_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn detail_url(&self, id: &str) -> String {
        format!("{}/details?key=/library/metadata/{}", self.web_url, id)
    }

    /// Announcement caption for a single album.
    pub fn album_caption(&self, album: &Album, artist: Option<&Artist>) -> String {
        let artist_title = album
            .artist_title
            .as_deref()
            .or(artist.map(|a| a.title.as_str()))
            .unwrap_or("Unknown Artist");
        let artist_id = album
            .artist_id
            .as_deref()
            .or(artist.map(|a| a.id.as_str()));

        let artist_part = match artist_id {
            Some(id) => html::link(&self.detail_url(id), &html::escape(artist_title)),
            None => html::escape(artist_title),
        };
        let album_part = html::link(&self.detail_url(&album.id), &html::escape(&album.title));

        let mut caption = format!("{} - {}{}", artist_part, album_part, year_suffix(album.year));

        let details = details_block(&album.genres, artist.and_then(|a| a.country.as_deref()));
        if !details.is_empty() {
            caption.push_str("\n\n");
            caption.push_str(&details);
        }
        caption
    }

    /// Artist header followed by the classified album sections.
    pub fn discography_caption(&self, artist: &Artist, albums: &[Album]) -> String {
        let mut caption = html::bold(&html::link(
            &self.detail_url(&artist.id),
            &html::escape(&artist.title),
        ));

        let details = details_block(&artist.genres, artist.country.as_deref());
        if !details.is_empty() {
            caption.push('\n');
            caption.push_str(&details);
        }

        let sections = self.classified_sections(albums);
        if !sections.is_empty() {
            caption.push_str("\n\n");
            caption.push_str(&sections);
        }
        caption
    }

    /// One titled section per non-empty album type, numbered from 1 within
    /// each section.
    pub fn classified_sections(&self, albums: &[Album]) -> String {
        partition_albums(albums)
            .into_iter()
            .map(|(album_type, entries)| {
                let mut section = html::bold(album_type.section_title());
                for (n, album) in entries.iter().enumerate() {
                    section.push('\n');
                    section.push_str(&self.album_entry(n + 1, album_type, album));
                }
                section
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn album_entry(&self, n: usize, album_type: AlbumType, album: &Album) -> String {
        let title = album_type.display_title(&album.title);
        format!(
            "{}. {}{}",
            n,
            html::link(&self.detail_url(&album.id), &html::escape(&title)),
            year_suffix(album.year)
        )
    }
}

/// Group albums by type in display order, skipping empty types. Albums keep
/// their input order inside a group.
pub fn partition_albums(albums: &[Album]) -> Vec<(AlbumType, Vec<&Album>)> {
    AlbumType::DISPLAY_ORDER
        .iter()
        .map(|album_type| {
            let members: Vec<&Album> = albums
                .iter()
                .filter(|album| album.album_type() == *album_type)
                .collect();
            (*album_type, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

/// Track listing split into blocks of at most [`TRACK_LISTING_CHUNK`] lines.
pub fn track_listing(tracks: &[Track]) -> Vec<String> {
    tracks
        .chunks(TRACK_LISTING_CHUNK)
        .map(|chunk| {
            chunk
                .iter()
                .map(|track| {
                    format!(
                        "{}. {} ({})",
                        track.index,
                        html::escape(&track.title),
                        format_duration(track.duration_ms)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}

/// Format milliseconds as `mm:ss`, flooring to whole seconds.
pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

fn year_suffix(year: Option<i32>) -> String {
    year.map(|y| format!(" ({})", y)).unwrap_or_default()
}

fn details_block(genres: &[String], country: Option<&str>) -> String {
    let mut lines = Vec::new();
    if !genres.is_empty() {
        lines.push(format!("Genre(s): {}", html::escape(&genres.join(" / "))));
    }
    if let Some(country) = country {
        lines.push(format!("Country: {}", html::escape(country)));
    }
    lines.join("\n")
}
