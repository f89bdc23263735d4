//! Tar archive creation.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use denpush_transfer::{ProgressReader, ProgressTracker, STREAM_BUFFER_SIZE, SharedObserver};
use tracing::{debug, info};

use crate::error::{IoResultExt, PackError};
use crate::naming::{ARCHIVE_EXTENSION, create_exclusive, with_extension_if_missing};
use crate::scanner::scan_source_tree;

/// Result of a successful [`create_archive`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Final archive path, extension included.
    pub path: PathBuf,
    /// Number of file entries written.
    pub entries: usize,
    /// Sum of the entries' content sizes.
    pub bytes: u64,
}

/// Resolves the directory to archive.
///
/// `None` means the working directory; relative paths are taken relative
/// to it.
pub fn resolve_source_dir(source: Option<&Path>, working_dir: &Path) -> PathBuf {
    match source {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => working_dir.join(dir),
        None => working_dir.to_path_buf(),
    }
}

/// Writes every regular file under `source` into a new tar archive.
///
/// `.tar` is appended to `destination` unless its file name already
/// contains it. Entry names are the files' paths relative to `source`,
/// byte for byte, with `/` between components. The
/// observer sees content bytes, so the last snapshot reports the sum of
/// the file sizes.
///
/// The source tree is listed before the archive file is created, so an
/// archive placed inside its own source directory never contains itself.
pub fn create_archive(
    destination: &Path,
    source: &Path,
    observer: SharedObserver,
) -> Result<ArchiveSummary, PackError> {
    let destination = with_extension_if_missing(destination, ARCHIVE_EXTENSION);
    if destination.exists() {
        return Err(PackError::DestinationExists { path: destination });
    }
    if !source.is_dir() {
        return Err(PackError::EmptySource {
            path: source.to_path_buf(),
        });
    }

    let (files, total_bytes) = scan_source_tree(source)?;
    if files.is_empty() {
        return Err(PackError::EmptySource {
            path: source.to_path_buf(),
        });
    }

    info!(
        source = %source.display(),
        destination = %destination.display(),
        files = files.len(),
        bytes = total_bytes,
        "creating archive"
    );

    let output = create_exclusive(&destination)?;
    let mut builder = tar::Builder::new(BufWriter::with_capacity(STREAM_BUFFER_SIZE, output));
    let mut tracker = ProgressTracker::new(total_bytes, observer);

    for file in &files {
        let handle = File::open(&file.path).at(&file.path)?;
        let metadata = handle.metadata().at(&file.path)?;

        let mut header = tar::Header::new_gnu();
        header.set_metadata(&metadata);

        let data = ProgressReader::with_tracker(handle.take(metadata.len()), &mut tracker);
        builder
            .append_data(&mut header, &file.relative, data)
            .at(&file.path)?;

        debug!(entry = %file.relative_path, size = metadata.len(), "archived entry");
    }

    let mut writer = builder.into_inner().at(&destination)?;
    writer.flush().at(&destination)?;

    Ok(ArchiveSummary {
        path: destination,
        entries: files.len(),
        bytes: tracker.bytes_transferred(),
    })
}
