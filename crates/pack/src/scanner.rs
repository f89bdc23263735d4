//! Source tree scanning.
//!
//! Recursively walks a directory and produces the list of regular files,
//! each with its on-disk relative path and a `/`-separated display form.

use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, PackError};

/// A regular file found under the scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute or root-joined path on disk.
    pub path: PathBuf,
    /// Path relative to the root, exactly as stored on disk.
    pub relative: PathBuf,
    /// `relative` joined with `/`, lossily decoded. For listings only.
    pub relative_path: String,
    /// Size in bytes at scan time.
    pub size: u64,
}

/// Scans `root` recursively and returns its regular files and their total size.
///
/// Entries are sorted by path within each directory, so the result is
/// stable for identical trees. Directories are descended into but not
/// reported; symbolic links are neither followed nor reported.
pub fn scan_source_tree(root: &Path) -> Result<(Vec<SourceFile>, u64), PackError> {
    let mut files = Vec::new();
    let mut total_size: u64 = 0;

    walk_dir(root, root, &mut files, &mut total_size)?;

    Ok((files, total_size))
}

fn walk_dir(
    root: &Path,
    current: &Path,
    files: &mut Vec<SourceFile>,
    total_size: &mut u64,
) -> Result<(), PackError> {
    let mut entries = std::fs::read_dir(current)
        .at(current)?
        .collect::<Result<Vec<_>, _>>()
        .at(current)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().at(&path)?;

        if file_type.is_dir() {
            walk_dir(root, &path, files, total_size)?;
        } else if file_type.is_file() {
            let relative = path
                .strip_prefix(root)
                .map_err(std::io::Error::other)
                .at(&path)?
                .to_path_buf();
            let relative_path = display_path(&relative);
            let size = entry.metadata().at(&path)?.len();

            files.push(SourceFile {
                path,
                relative,
                relative_path,
                size,
            });
            *total_size += size;
        }
    }

    Ok(())
}

/// Joins the components of `relative` with `/`. Separator characters that
/// are legal inside a file name (`\` on Unix) are kept as they are.
fn display_path(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
