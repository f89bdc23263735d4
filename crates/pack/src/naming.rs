//! Output naming: extension normalization, collision-free names and
//! exclusive file creation.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, PackError};

/// Extension appended to archives.
pub const ARCHIVE_EXTENSION: &str = ".tar";

/// Extension appended to compressed artifacts.
pub const COMPRESSED_EXTENSION: &str = ".zstd";

/// Appends `extension` unless the file name already contains it
/// (case-insensitive), e.g. `out` → `out.tar`, `OUT.TAR` stays as is.
pub fn with_extension_if_missing(path: &Path, extension: &str) -> PathBuf {
    let already_present = path
        .file_name()
        .map(|name| {
            name.to_string_lossy()
                .to_lowercase()
                .contains(&extension.to_lowercase())
        })
        .unwrap_or(false);

    if already_present {
        return path.to_path_buf();
    }

    let mut name = OsString::from(path.as_os_str());
    name.push(extension);
    PathBuf::from(name)
}

/// Returns `base`, or the first of `base1`, `base2`, … with no file of
/// that name in `dir`.
pub fn generate_unique_file_name(dir: &Path, base: &str) -> String {
    generate_unique_file_name_with(dir, base, &[""])
}

/// Like [`generate_unique_file_name`], but a candidate is also taken when
/// `candidate + suffix` exists for any of `suffixes`.
///
/// Used to reserve a base name for every file a pipeline derives from it
/// (`name.tar`, `name.tar.zstd`).
pub fn generate_unique_file_name_with(dir: &Path, base: &str, suffixes: &[&str]) -> String {
    let taken = |candidate: &str| {
        suffixes
            .iter()
            .any(|suffix| dir.join(format!("{candidate}{suffix}")).exists())
    };

    let mut candidate = base.to_string();
    let mut counter: u64 = 0;
    while taken(&candidate) {
        counter += 1;
        candidate = format!("{base}{counter}");
    }
    candidate
}

/// Creates `path` for writing, failing if anything already exists there.
///
/// This reserves the name before any content is produced, so permission
/// and collision errors surface before the expensive work starts.
pub fn create_exclusive(path: &Path) -> Result<File, PackError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(PackError::DestinationExists {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e).at(path),
    }
}
