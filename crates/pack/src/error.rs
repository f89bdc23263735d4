//! Pack error types.

use std::path::{Path, PathBuf};

/// Errors produced while archiving or compressing.
///
/// All of them are fatal for the pipeline: there is no partial success.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("file {} already exists", .path.display())]
    DestinationExists { path: PathBuf },

    #[error("no files found in the source directory {}", .path.display())]
    EmptySource { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Attaches the path an I/O operation was working on.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T, PackError>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T, PackError> {
        self.map_err(|source| PackError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
