//! Folder archives for downloads
//!
//! A folder download is served as a zip file built from the directory at
//! request time. [`ArchiveBuilder`] does the walking and writing;
//! [`TempArchive`] ties the resulting file to a value whose drop deletes it,
//! so a response body that owns it cleans up however the transfer ends.

mod builder;
mod temp;

use std::path::PathBuf;

pub use builder::{build_archive, ArchiveBuilder, ArchiveSummary};
pub use temp::TempArchive;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }
}
