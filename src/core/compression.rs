//! Optional zlib stage applied to attribute payload bodies.
//!
//! The codec level (0-10) selects whether bodies are deflated and how hard.

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::util::{Error, Result};

/// Highest accepted compression level.
pub const MAX_COMPRESSION_LEVEL: u8 = 10;

/// Map a codec compression level onto a zlib level.
///
/// Returns `None` for level 0 (no deflate stage).
pub fn zlib_level(level: u8) -> Option<Compression> {
    match level {
        0 => None,
        1..=3 => Some(Compression::fast()),
        4..=7 => Some(Compression::default()),
        _ => Some(Compression::best()),
    }
}

/// Compress `data` with zlib.
///
/// Returns `None` when compression is disabled or does not save space,
/// in which case the caller stores the data raw.
pub fn deflate(data: &[u8], level: u8) -> Result<Option<Vec<u8>>> {
    let Some(compression) = zlib_level(level) else {
        return Ok(None);
    };
    if data.is_empty() {
        return Ok(None);
    }

    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), compression);
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;

    if compressed.len() >= data.len() {
        return Ok(None);
    }
    Ok(Some(compressed))
}

/// Decompress zlib `data` that must expand to exactly `expected_len` bytes.
pub fn inflate(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data).take(expected_len as u64 + 1);
    // Deflate cannot expand beyond roughly 1032:1.
    let mut decompressed = Vec::with_capacity(expected_len.min(data.len().saturating_mul(1032)));
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::format(format!("corrupt zlib body: {e}")))?;
    if decompressed.len() != expected_len {
        return Err(Error::format(format!(
            "zlib body expanded to {} bytes, expected {}",
            decompressed.len(),
            expected_len
        )));
    }
    Ok(decompressed)
}
