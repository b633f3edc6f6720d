//! Snapshot codec for the file-backed storage area.
//!
//! The whole key space is written as one framed snapshot:
//! ```text
//! [magic: 4 bytes "FFLY"][version: 1 byte][length: 4 bytes LE][data: N bytes JSON][crc32: 4 bytes LE]
//! ```

use std::collections::BTreeMap;

use crc32fast::Hasher;

use crate::storage::StorageError;

/// Current codec version.
const CODEC_VERSION: u8 = 1;

/// Magic bytes identifying a snapshot file.
pub const MAGIC: [u8; 4] = *b"FFLY";

const HEADER_LEN: usize = MAGIC.len() + 1 + 4;
const TRAILER_LEN: usize = 4;

/// Snapshots larger than this are rejected as corrupt (browser areas hold a few MiB).
const MAX_SNAPSHOT_SIZE: usize = 64 * 1024 * 1024;

fn corrupt(reason: impl Into<String>) -> StorageError {
    StorageError::Backend(format!("corrupt snapshot: {}", reason.into()))
}

fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Encode the full item map.
pub fn encode_snapshot(items: &BTreeMap<String, String>) -> Result<Vec<u8>, StorageError> {
    let data = serde_json::to_vec(items).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let len = u32::try_from(data.len())
        .map_err(|_| StorageError::Serialization(format!("snapshot of {} bytes is too large", data.len())))?;

    let mut out = Vec::with_capacity(HEADER_LEN + data.len() + TRAILER_LEN);
    out.extend_from_slice(&MAGIC);
    out.push(CODEC_VERSION);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&data);
    out.extend_from_slice(&checksum(&data).to_le_bytes());
    Ok(out)
}

/// Decode a snapshot, verifying magic, version, length and checksum.
pub fn decode_snapshot(bytes: &[u8]) -> Result<BTreeMap<String, String>, StorageError> {
    if bytes.len() < HEADER_LEN + TRAILER_LEN {
        return Err(corrupt(format!("truncated header ({} bytes)", bytes.len())));
    }
    if bytes[..4] != MAGIC {
        return Err(corrupt(format!("invalid magic bytes {:?}", &bytes[..4])));
    }
    if bytes[4] != CODEC_VERSION {
        return Err(corrupt(format!(
            "unsupported codec version {} (expected {CODEC_VERSION})",
            bytes[4]
        )));
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&bytes[5..9]);
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_SNAPSHOT_SIZE {
        return Err(corrupt(format!("length {len} exceeds maximum {MAX_SNAPSHOT_SIZE}")));
    }
    if bytes.len() != HEADER_LEN + len + TRAILER_LEN {
        return Err(corrupt(format!(
            "length {len} does not match file size {}",
            bytes.len()
        )));
    }

    let data = &bytes[HEADER_LEN..HEADER_LEN + len];
    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&bytes[HEADER_LEN + len..]);
    let stored = u32::from_le_bytes(crc_bytes);
    let computed = checksum(data);
    if stored != computed {
        return Err(corrupt(format!(
            "CRC mismatch: stored={stored:08x}, computed={computed:08x}"
        )));
    }

    serde_json::from_slice(data).map_err(|e| corrupt(e.to_string()))
}
