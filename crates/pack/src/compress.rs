//! Streaming zstd compression of a finished archive.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use denpush_transfer::{ProgressReader, STREAM_BUFFER_SIZE, SharedObserver};
use tracing::info;

use crate::error::{IoResultExt, PackError};
use crate::level::{MAX_NATIVE_LEVEL, MIN_NATIVE_LEVEL};
use crate::naming::create_exclusive;

/// Compresses `input` into a new file at `output` with zstd at `native_level`.
///
/// `output` is used verbatim and must not exist. The level is clamped to
/// the range [`map_level`](crate::map_level) produces. The observer sees
/// uncompressed input bytes. Returns the compressed size.
pub fn compress_file(
    input: &Path,
    output: &Path,
    native_level: i32,
    observer: SharedObserver,
) -> Result<u64, PackError> {
    let level = native_level.clamp(MIN_NATIVE_LEVEL, MAX_NATIVE_LEVEL);

    let source = File::open(input).at(input)?;
    let input_len = source.metadata().at(input)?.len();
    let destination = create_exclusive(output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        level,
        bytes = input_len,
        "compressing"
    );

    let mut reader = BufReader::with_capacity(
        STREAM_BUFFER_SIZE,
        ProgressReader::new(source, input_len, observer),
    );
    let writer = BufWriter::with_capacity(STREAM_BUFFER_SIZE, destination);

    let mut encoder = zstd::Encoder::new(writer, level).at(output)?;
    encoder.include_checksum(true).at(output)?;
    io::copy(&mut reader, &mut encoder).at(input)?;

    let mut writer = encoder.finish().at(output)?;
    writer.flush().at(output)?;

    let compressed = writer.get_ref().metadata().at(output)?.len();
    info!(output = %output.display(), bytes = compressed, "compressed");
    Ok(compressed)
}

/// Decompresses a zstd file produced by [`compress_file`] into a new file.
///
/// Returns the decompressed size.
pub fn decompress_file(input: &Path, output: &Path) -> Result<u64, PackError> {
    let source = File::open(input).at(input)?;
    let destination = create_exclusive(output)?;

    let mut decoder = zstd::Decoder::new(source).at(input)?;
    let mut writer = BufWriter::with_capacity(STREAM_BUFFER_SIZE, destination);
    let written = io::copy(&mut decoder, &mut writer).at(input)?;
    writer.flush().at(output)?;

    Ok(written)
}
