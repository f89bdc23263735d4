//! Directory archiving and level-mapped zstd compression.
//!
//! # Pipeline
//!
//! 1. **Scan**: walk the source tree and list its regular files
//! 2. **Archive**: stream those files into a tar file created exclusively
//! 3. **Compress**: stream the tar through a zstd encoder at a native level
//!
//! Every stage reads through a [`denpush_transfer::ProgressReader`], so
//! callers observe byte-level progress for both disk stages.

pub mod archive;
pub mod compress;
pub mod error;
pub mod level;
pub mod naming;
pub mod scanner;

pub use archive::{ArchiveSummary, create_archive, resolve_source_dir};
pub use compress::{compress_file, decompress_file};
pub use error::PackError;
pub use level::{DEFAULT_LEVEL, MAX_LEVEL, MAX_NATIVE_LEVEL, MIN_LEVEL, MIN_NATIVE_LEVEL, map_level};
pub use naming::{
    ARCHIVE_EXTENSION, COMPRESSED_EXTENSION, create_exclusive, generate_unique_file_name,
    generate_unique_file_name_with, with_extension_if_missing,
};
pub use scanner::{SourceFile, scan_source_tree};
