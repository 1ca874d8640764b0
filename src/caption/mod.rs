//! Album classification and caption rendering.

mod album_type;
mod composer;

pub use album_type::AlbumType;
pub use composer::{
    format_duration, partition_albums, track_listing, CaptionComposer, TRACK_LISTING_CHUNK,
};
