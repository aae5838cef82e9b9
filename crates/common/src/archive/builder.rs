use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Seek, Write};
use std::path::{Component, Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ArchiveError;

/// What ended up in a finished archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Number of file entries written
    pub entries: usize,
    /// Uncompressed bytes copied into the archive
    pub bytes: u64,
}

/// A regular file found by the walk, with its archive entry name
#[derive(Debug)]
struct WalkedFile {
    path: PathBuf,
    entry_name: String,
    len: u64,
}

/// Writes the regular files under a directory into a deflated zip archive.
///
/// Entries are named by their path relative to the source directory with `/`
/// separators. Directories are not stored as entries of their own, so an empty
/// directory produces a valid archive with no entries.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    source: PathBuf,
    skip: Vec<PathBuf>,
}

impl ArchiveBuilder {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            skip: Vec::new(),
        }
    }

    /// Leave `path` out of the archive even if it lies under the source.
    ///
    /// Used for the output file itself when it is written inside the tree
    /// being archived.
    pub fn skip(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.skip.push(fs::canonicalize(&path).unwrap_or(path));
        self
    }

    /// Walk the source directory and stream every file into `writer`.
    ///
    /// The first file or directory that cannot be read aborts the build.
    pub fn write_to<W: Write + Seek>(
        &self,
        writer: W,
    ) -> Result<(W, ArchiveSummary), ArchiveError> {
        if !self.source.is_dir() {
            return Err(ArchiveError::NotADirectory(self.source.clone()));
        }

        let mut files = Vec::new();
        collect_files(&self.source, &self.source, &self.skip, &mut files)?;

        let mut zip = ZipWriter::new(writer);
        let mut summary = ArchiveSummary::default();

        for walked in files {
            let mut file =
                File::open(&walked.path).map_err(|e| ArchiveError::io(&walked.path, e))?;

            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .large_file(walked.len >= u32::MAX as u64);
            zip.start_file(walked.entry_name.as_str(), options)?;

            let copied =
                io::copy(&mut file, &mut zip).map_err(|e| ArchiveError::io(&walked.path, e))?;

            tracing::debug!(entry = %walked.entry_name, bytes = copied, "archive: added file");
            summary.entries += 1;
            summary.bytes += copied;
        }

        let writer = zip.finish()?;
        Ok((writer, summary))
    }
}

/// Build an archive of `source` at `archive_path`.
///
/// The archive file is created exclusively and removed again if the build
/// fails, so a failed build never leaves a truncated archive behind.
pub fn build_archive(source: &Path, archive_path: &Path) -> Result<ArchiveSummary, ArchiveError> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(archive_path)
        .map_err(|e| ArchiveError::io(archive_path, e))?;

    let result = ArchiveBuilder::new(source)
        .skip(archive_path)
        .write_to(BufWriter::new(file))
        .and_then(|(mut writer, summary)| {
            writer
                .flush()
                .map_err(|e| ArchiveError::io(archive_path, e))?;
            Ok(summary)
        });

    if let Err(e) = &result {
        tracing::warn!(
            path = %archive_path.display(),
            "archive: build failed, removing partial file: {}",
            e
        );
        if let Err(remove_err) = fs::remove_file(archive_path) {
            tracing::error!(
                path = %archive_path.display(),
                "archive: failed to remove partial file: {}",
                remove_err
            );
        }
    }

    result
}

/// Recursively gather the regular files below `dir`, sorted by name
fn collect_files(
    root: &Path,
    dir: &Path,
    skip: &[PathBuf],
    out: &mut Vec<WalkedFile>,
) -> Result<(), ArchiveError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| ArchiveError::io(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ArchiveError::io(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ArchiveError::io(&path, e))?;

        if file_type.is_dir() {
            collect_files(root, &path, skip, out)?;
            continue;
        }

        // follow symlinks to files, but never into directories
        let metadata = if file_type.is_symlink() {
            fs::metadata(&path).map_err(|e| ArchiveError::io(&path, e))?
        } else {
            entry.metadata().map_err(|e| ArchiveError::io(&path, e))?
        };

        if metadata.is_dir() {
            tracing::debug!(path = %path.display(), "archive: skipping symlinked directory");
            continue;
        }
        if !metadata.is_file() {
            tracing::debug!(path = %path.display(), "archive: skipping special file");
            continue;
        }

        if is_skipped(&path, skip) {
            tracing::debug!(path = %path.display(), "archive: skipping output file");
            continue;
        }

        let Some(entry_name) = entry_name(root, &path) else {
            continue;
        };
        out.push(WalkedFile {
            path,
            entry_name,
            len: metadata.len(),
        });
    }

    Ok(())
}

fn is_skipped(path: &Path, skip: &[PathBuf]) -> bool {
    skip.iter().any(|skipped| {
        skipped.file_name() == path.file_name()
            && fs::canonicalize(path).is_ok_and(|canonical| &canonical == skipped)
    })
}

/// Path of `path` relative to `root`, joined with forward slashes
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
