//! CRC32 checksums for batch artifacts
//!
//! Uses CRC32 (IEEE polynomial) via crc32fast.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crc32fast::Hasher;

use super::errors::{LocatorError, LocatorResult};

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Computes a CRC32 checksum of an entire file, reading it in chunks.
pub fn compute_file_checksum(path: &Path) -> LocatorResult<u32> {
    let io_err = |e| LocatorError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(io_err)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Formats a checksum as `crc32:xxxxxxxx`
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}
