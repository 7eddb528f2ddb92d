//! zlib compression of record payloads.

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::util::{Error, Result};

/// Upper bound accepted for a decompressed payload.
const MAX_PAYLOAD: usize = 1024 * 1024 * 1024;

/// Compress `data` at `level` (1-9).
///
/// Returns `None` when compression is disabled (`level <= 0`) or does not
/// save space. Output format: `[uncompressed_size: u64 LE][zlib stream]`.
pub fn compress(data: &[u8], level: i32) -> Result<Option<Vec<u8>>> {
    if level <= 0 || data.is_empty() {
        return Ok(None);
    }

    let compression_level = match level {
        1 => Compression::fast(),
        2..=5 => Compression::default(),
        _ => Compression::best(),
    };

    let mut encoder = ZlibEncoder::new(Vec::new(), compression_level);
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;

    if compressed.len() + 8 >= data.len() {
        return Ok(None);
    }

    let mut result = Vec::with_capacity(8 + compressed.len());
    result.extend_from_slice(&(data.len() as u64).to_le_bytes());
    result.extend_from_slice(&compressed);
    Ok(Some(result))
}

/// Decompress a payload produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 8 {
        return Err(Error::corrupt("compressed payload shorter than its size header"));
    }

    let mut size = [0u8; 8];
    size.copy_from_slice(&data[..8]);
    let uncompressed_size = u64::from_le_bytes(size) as usize;
    if uncompressed_size > MAX_PAYLOAD {
        return Err(Error::corrupt(format!(
            "compressed payload claims {} bytes",
            uncompressed_size
        )));
    }

    let mut decoder = ZlibDecoder::new(&data[8..]);
    let mut decompressed = Vec::with_capacity(uncompressed_size);
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::corrupt(format!("zlib: {}", e)))?;

    if decompressed.len() != uncompressed_size {
        return Err(Error::corrupt(format!(
            "decompressed {} bytes, expected {}",
            decompressed.len(),
            uncompressed_size
        )));
    }
    Ok(decompressed)
}
