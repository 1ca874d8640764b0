//! Catalog payloads and on-disk fixtures.

#![allow(dead_code)]

use super::constants::*;
use serde_json::{json, Value};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

pub fn artist_json() -> Value {
    json!({
        "ratingKey": ARTIST_ID,
        "type": "artist",
        "title": ARTIST_TITLE,
        "thumb": format!("/library/metadata/{}/thumb/1", ARTIST_ID),
        "Genre": [{"tag": "Black Metal"}, {"tag": "Ambient"}],
        "Country": [{"tag": "Norway"}]
    })
}

pub fn album_json() -> Value {
    json!({
        "ratingKey": ALBUM_ID,
        "type": "album",
        "title": ALBUM_TITLE,
        "parentRatingKey": ARTIST_ID,
        "parentTitle": ARTIST_TITLE,
        "year": 1996,
        "thumb": format!("/library/metadata/{}/thumb/1", ALBUM_ID),
        "Genre": [{"tag": "Black Metal"}]
    })
}

pub fn ep_json() -> Value {
    json!({
        "ratingKey": EP_ID,
        "type": "album",
        "title": EP_TITLE,
        "parentRatingKey": ARTIST_ID,
        "parentTitle": ARTIST_TITLE,
        "year": 1993,
        "thumb": format!("/library/metadata/{}/thumb/1", EP_ID)
    })
}

/// An item from another library section.
pub fn season_json() -> Value {
    json!({
        "ratingKey": "500",
        "type": "season",
        "title": "Season 1",
        "parentTitle": "Some Show"
    })
}

fn track_json(id: &str, index: u32, title: &str, duration: u64, file: &str) -> Value {
    json!({
        "ratingKey": id,
        "type": "track",
        "title": title,
        "parentRatingKey": ALBUM_ID,
        "grandparentTitle": ARTIST_TITLE,
        "index": index,
        "duration": duration,
        "Media": [{"Part": [{
            "file": format!("{}/{}/{}/{}", CATALOG_PREFIX, ARTIST_TITLE, ALBUM_DIR, file)
        }]}]
    })
}

pub fn tracks_json() -> Vec<Value> {
    vec![
        track_json(TRACK_1_ID, 1, "Dunkelheit", 424000, TRACK_1_FILE),
        track_json(TRACK_2_ID, 2, "Jesus' Tod", 519000, TRACK_2_FILE),
    ]
}

pub fn metadata_by_id(id: &str) -> Option<Value> {
    match id {
        ARTIST_ID => Some(artist_json()),
        ALBUM_ID => Some(album_json()),
        EP_ID => Some(ep_json()),
        TRACK_1_ID => tracks_json().into_iter().next(),
        TRACK_2_ID => tracks_json().into_iter().nth(1),
        _ => None,
    }
}

pub fn children_of(id: &str) -> Vec<Value> {
    match id {
        ARTIST_ID => vec![album_json(), ep_json()],
        ALBUM_ID => tracks_json(),
        _ => Vec::new(),
    }
}

/// Wrap metadata items the way the catalog service does.
pub fn container(items: Vec<Value>) -> Value {
    json!({"MediaContainer": {"size": items.len(), "Metadata": items}})
}

/// A zip holding one album folder, as a user would upload it.
pub fn album_zip() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for name in [TRACK_1_FILE, TRACK_2_FILE, "cover.jpg"] {
        writer
            .start_file(format!("{}/{}", ALBUM_DIR, name), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(name.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn corrupt_zip() -> Vec<u8> {
    b"PK\x03\x04 this archive was cut short".to_vec()
}

/// Put the fixture album's files under `library_root`, where the rewritten
/// catalog paths point.
pub fn create_local_album(library_root: &Path) -> PathBuf {
    let album_dir = library_root.join(ARTIST_TITLE).join(ALBUM_DIR);
    std::fs::create_dir_all(&album_dir).unwrap();
    for name in [TRACK_1_FILE, TRACK_2_FILE] {
        std::fs::write(album_dir.join(name), name.as_bytes()).unwrap();
    }
    album_dir
}
