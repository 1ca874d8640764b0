//! Fixture ids and credentials shared by the end-to-end tests.

#![allow(dead_code)]

pub const TEST_TOKEN: &str = "test-catalog-token";
pub const SECTION_ID: u32 = 1;

/// Prefix the fake catalog reports track files under.
pub const CATALOG_PREFIX: &str = "/data/music";

pub const ARTIST_ID: &str = "10";
pub const ARTIST_TITLE: &str = "Burzum";
pub const ALBUM_ID: &str = "20";
pub const ALBUM_TITLE: &str = "Filosofem";
pub const ALBUM_DIR: &str = "1996 - Filosofem";
pub const EP_ID: &str = "21";
pub const EP_TITLE: &str = "Aske (EP)";
pub const TRACK_1_ID: &str = "300";
pub const TRACK_1_FILE: &str = "01 - Dunkelheit.flac";
pub const TRACK_2_ID: &str = "301";
pub const TRACK_2_FILE: &str = "02 - Jesus' Tod.flac";
pub const MISSING_ID: &str = "999";

pub const ARTWORK_BYTES: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";

pub const CHANNEL: &str = "@dark_corner";
