//! Acquisition of submitted media onto local disk.

mod naming;
mod packaging;
mod service;
mod tags;

pub use naming::{
    artist_from_filename, filename_from_url, sanitize_component, DirectLink,
    DIRECT_LINK_SEPARATOR,
};
pub use packaging::{AlbumPackager, PackagingError};
pub use service::{AcquisitionService, AcquisitionSource, GroupedAcquisition};
pub use tags::{placement_for, read_tags, AudioTags, Placement, UNKNOWN_PERFORMER};

use std::path::PathBuf;
use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Download failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Attachment could not be resolved: {0}")]
    Attachment(#[from] TransportError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tag read failed: {0}")]
    Tags(String),
}
