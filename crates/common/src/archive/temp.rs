use std::fs::File;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::builder::{ArchiveBuilder, ArchiveSummary};
use super::ArchiveError;

const TEMP_PREFIX: &str = ".filegate-archive-";
const TEMP_SUFFIX: &str = ".zip";

/// An archive on disk that lives exactly as long as this value.
///
/// The file gets a unique name inside the scratch directory and is removed
/// when the value is dropped, whether or not its contents were ever read.
#[derive(Debug)]
pub struct TempArchive {
    file: NamedTempFile,
    summary: ArchiveSummary,
}

impl TempArchive {
    /// Archive `source` into a new temporary file under `scratch_dir`.
    ///
    /// On failure the half-written file is removed before the error returns.
    pub fn build_in(scratch_dir: &Path, source: &Path) -> Result<Self, ArchiveError> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(scratch_dir)
            .map_err(|e| ArchiveError::io(scratch_dir, e))?;

        let archive_path = file.path().to_path_buf();
        let (_, summary) = ArchiveBuilder::new(source)
            .skip(&archive_path)
            .write_to(file.as_file_mut())?;
        file.as_file_mut()
            .flush()
            .map_err(|e| ArchiveError::io(&archive_path, e))?;

        tracing::info!(
            source = %source.display(),
            archive = %archive_path.display(),
            entries = summary.entries,
            bytes = summary.bytes,
            "archive: built temporary archive"
        );

        Ok(Self { file, summary })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn summary(&self) -> ArchiveSummary {
        self.summary
    }

    /// Open an independent read handle positioned at the start of the archive
    pub fn open(&self) -> Result<File, ArchiveError> {
        self.file
            .reopen()
            .map_err(|e| ArchiveError::io(self.file.path(), e))
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        tracing::debug!(
            archive = %self.file.path().display(),
            "archive: removing temporary archive"
        );
    }
}
