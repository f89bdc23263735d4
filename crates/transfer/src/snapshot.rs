use std::time::Duration;

const BITS_PER_BYTE: f64 = 8.0;
const BITS_PER_MEGABIT: f64 = 1024.0 * 1024.0;

/// Point-in-time view of a single transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Bytes moved so far. Never exceeds `total_bytes`.
    pub bytes_transferred: u64,
    /// Known length of the underlying resource.
    pub total_bytes: u64,
    /// Wall-clock time since tracking began.
    pub elapsed: Duration,
    /// Cumulative average throughput in megabits per second.
    pub megabits_per_second: f64,
}

impl ProgressSnapshot {
    /// Builds a snapshot, clamping `bytes_transferred` to `total_bytes`.
    pub fn new(bytes_transferred: u64, total_bytes: u64, elapsed: Duration) -> Self {
        let bytes_transferred = bytes_transferred.min(total_bytes);
        Self {
            bytes_transferred,
            total_bytes,
            elapsed,
            megabits_per_second: cumulative_mbps(bytes_transferred, elapsed),
        }
    }

    /// Returns `true` once every byte of the resource has been seen.
    pub fn is_complete(&self) -> bool {
        self.bytes_transferred == self.total_bytes
    }
}

/// Average throughput since the start of a transfer, in megabits per second.
///
/// Returns 0.0 when no time has elapsed.
pub fn cumulative_mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 * BITS_PER_BYTE / (secs * BITS_PER_MEGABIT)
}
