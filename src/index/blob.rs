//! Index blob files
//!
//! Both index kinds are persisted as one checksummed blob that replaces the
//! previous file wholesale:
//! ```text
//! ┌──────────┬─────────────┬────────────────┬───────────┬──────────┐
//! │Magic (4) │ Version (2) │ EntryCount (8) │ CRC32 (4) │   Body   │
//! └──────────┴─────────────┴────────────────┴───────────┴──────────┘
//! ```
//! The new blob is written to `{file}.tmp` and renamed over the old file, so
//! a reader never observes a half-written index.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::storage::temp_path;

/// Current index blob format version
pub(crate) const BLOB_VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + EntryCount (8) + CRC (4) = 18 bytes
pub(crate) const BLOB_HEADER_SIZE: usize = 18;

/// Checked contents of an index blob
#[derive(Debug, Default)]
pub(crate) struct Blob {
    pub entry_count: u64,
    pub body: Vec<u8>,
}

impl Blob {
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0 && self.body.is_empty()
    }
}

/// Replace the blob at `path`
pub(crate) fn write_blob(
    path: &Path,
    magic: &[u8; 4],
    entry_count: u64,
    body: &[u8],
    sync: bool,
) -> Result<()> {
    let tmp = temp_path(path);

    let mut out = Vec::with_capacity(BLOB_HEADER_SIZE + body.len());
    out.extend_from_slice(magic);
    out.extend_from_slice(&BLOB_VERSION.to_le_bytes());
    out.extend_from_slice(&entry_count.to_le_bytes());
    out.extend_from_slice(&crc32fast::hash(body).to_le_bytes());
    out.extend_from_slice(body);

    {
        let mut file = File::create(&tmp)?;
        file.write_all(&out)?;
        if sync {
            file.sync_all()?;
        }
    }

    fs::rename(&tmp, path)?;

    if sync {
        if let Some(parent) = path.parent() {
            sync_directory(parent)?;
        }
    }

    Ok(())
}

/// Read and verify the blob at `path`
///
/// Returns:
/// - `Ok(None)`: no file
/// - `Ok(Some(blob))` with an empty blob: zero-length file
/// - `Err(CorruptIndex)`: bad magic, version or checksum
pub(crate) fn read_blob(path: &Path, magic: &[u8; 4]) -> Result<Option<Blob>> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    if data.is_empty() {
        return Ok(Some(Blob::default()));
    }

    let corrupt = |msg: String| StoreError::CorruptIndex(format!("{}: {}", path.display(), msg));

    if data.len() < BLOB_HEADER_SIZE {
        return Err(corrupt(format!(
            "truncated header ({} of {} bytes)",
            data.len(),
            BLOB_HEADER_SIZE
        )));
    }

    if &data[0..4] != magic {
        return Err(corrupt(format!(
            "invalid magic: expected {:?}, got {:?}",
            magic,
            &data[0..4]
        )));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != BLOB_VERSION {
        return Err(corrupt(format!("unsupported version {}", version)));
    }

    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&data[6..14]);
    let entry_count = u64::from_le_bytes(count_bytes);

    let stored_crc = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
    let body = data.split_off(BLOB_HEADER_SIZE);
    let crc = crc32fast::hash(&body);
    if crc != stored_crc {
        return Err(corrupt(format!(
            "checksum mismatch: expected {:#010x}, got {:#010x}",
            stored_crc, crc
        )));
    }

    Ok(Some(Blob { entry_count, body }))
}

/// Make a rename inside `dir` durable
#[cfg(unix)]
fn sync_directory(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> Result<()> {
    // NTFS journals metadata; directory handles cannot be fsynced
    Ok(())
}
