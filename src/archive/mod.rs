//! Archive extraction and the filesystem cleanup that follows it.

mod extractor;
mod normalizer;

pub use extractor::{
    ArchiveExtractor, ArchiveFormat, ExtractionError, ExtractionOutcome, ExtractionStrategy,
};
pub use normalizer::{FilesystemNormalizer, NormalizeError, NormalizeReport, ALBUM_DIR_MODE};
