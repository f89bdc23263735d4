//! Mapping from the user-facing 1–100 scale to zstd's native levels.

/// Lowest user-facing compression level.
pub const MIN_LEVEL: u8 = 1;

/// Highest user-facing compression level.
pub const MAX_LEVEL: u8 = 100;

/// Level used when the caller does not pick one.
pub const DEFAULT_LEVEL: u8 = MAX_LEVEL;

/// Lowest zstd level the mapper produces.
pub const MIN_NATIVE_LEVEL: i32 = 1;

/// Highest zstd level the mapper produces.
pub const MAX_NATIVE_LEVEL: i32 = 22;

/// Maps a user level in `[1, 100]` onto zstd's `[1, 22]`.
///
/// Linear interpolation truncated toward zero, then clamped, so that
/// `1 → 1`, `50 → 11` and `100 → 22`. Out-of-range inputs are clamped to
/// the nearest native bound.
pub fn map_level(level: u8) -> i32 {
    let span = f64::from(MAX_LEVEL - MIN_LEVEL);
    let native_span = f64::from(MAX_NATIVE_LEVEL - MIN_NATIVE_LEVEL);
    let scaled = (f64::from(level) - f64::from(MIN_LEVEL)) / span * native_span
        + f64::from(MIN_NATIVE_LEVEL);

    (scaled.trunc() as i32).clamp(MIN_NATIVE_LEVEL, MAX_NATIVE_LEVEL)
}
