//! Progress-instrumented streaming I/O for artifact transfers.
//!
//! Every read that passes through a [`ProgressReader`] is counted by a
//! [`ProgressTracker`], which hands a [`ProgressSnapshot`] to the registered
//! [`ProgressObserver`]. The same tracker drives the archive, compression and
//! upload stages, so throughput is reported identically for disk and network.

mod checksum;
mod format;
mod progress;
mod snapshot;

pub use checksum::calculate_file_checksum;
pub use format::format_bytes;
pub use progress::{ProgressObserver, ProgressReader, ProgressTracker, SharedObserver};
pub use snapshot::{ProgressSnapshot, cumulative_mbps};

/// Buffer size for streaming file I/O: 128 KiB.
///
/// Large enough to amortize syscalls and zstd frame overhead.
pub const STREAM_BUFFER_SIZE: usize = 128 * 1024;
