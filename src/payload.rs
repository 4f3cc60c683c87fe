//! Write-side counterpart of the decrypt and inflate read pipeline

use crate::cipher::Cipher;
use crate::error::{PackError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// zlib-compress `data` at maximum level, then encode it from stream offset 0
///
/// The result reads back through a loader's `open_with(path, key, true)`.
/// Without a cipher the payload is only compressed.
pub fn seal(data: &[u8], cipher: Option<&Cipher>) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| PackError::CompressionFailed(e.to_string()))?;
    let mut sealed = encoder
        .finish()
        .map_err(|e| PackError::CompressionFailed(e.to_string()))?;

    if let Some(cipher) = cipher {
        cipher.encode(&mut sealed);
    }
    Ok(sealed)
}
