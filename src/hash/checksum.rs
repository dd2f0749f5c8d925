// src/hash/checksum.rs

use std::io::{self, Read};
use std::path::Path;

use tracing::trace;

use crate::errors::{CachebustError, Result};
use crate::fs::FileSystem;

/// Reflected form of the IEEE 802.3 generator polynomial.
const CRC32_POLY: u32 = 0xEDB8_8320;

/// Initial register value; the final value is complemented.
const CRC32_SEED: u32 = 0xFFFF_FFFF;

/// Read buffer size used when streaming a file.
const CHUNK_SIZE: usize = 8192;

/// Precomputed CRC-32 lookup table (256 entries), built at compile time.
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Incremental CRC-32 (the zip/PNG variant).
///
/// Feeding the same bytes in any chunking produces the same value.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: CRC32_SEED }
    }

    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            let idx = ((crc ^ byte as u32) & 0xFF) as usize;
            crc = (crc >> 8) ^ CRC32_TABLE[idx];
        }
        self.state = crc;
    }

    pub fn finalize(self) -> u32 {
        !self.state
    }

    /// One-shot checksum of an in-memory buffer.
    pub fn checksum(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream `reader` to the end and return its checksum.
pub fn checksum_reader<R: Read>(mut reader: R) -> io::Result<u32> {
    let mut crc = Crc32::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        crc.update(&buf[..n]);
    }
    Ok(crc.finalize())
}

/// Compute the checksum of the file at `path`.
///
/// Any failure to open or read the file is reported as
/// [`CachebustError::ReadFailure`]; the caller decides whether to retry.
pub fn checksum_file(fs: &dyn FileSystem, path: &Path) -> Result<u32> {
    let reader = fs.open_read(path).map_err(|source| CachebustError::ReadFailure {
        path: path.to_path_buf(),
        source,
    })?;

    let value = checksum_reader(reader).map_err(|e| CachebustError::ReadFailure {
        path: path.to_path_buf(),
        source: anyhow::Error::new(e),
    })?;

    trace!(?path, checksum = value, "computed checksum");
    Ok(value)
}
