//! Data File
//!
//! Append-only record storage with independent read cursors.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::{Result, StoreError};

use super::Location;

/// Append-only byte store for one table
///
/// ## Concurrency:
/// - `writer`: one append handle, appends are serialized by its Mutex
/// - `len`: published only after an append has been fully written, so a
///   reader never sees a length that covers half-written bytes
/// - Reads open their own file handle and never touch `writer`
pub struct DataFile {
    /// Path to the data file
    path: PathBuf,

    /// Handle opened in append mode
    writer: Mutex<File>,

    /// Bytes fully written so far
    len: AtomicU64,

    /// Durability policy for appends
    sync_strategy: SyncStrategy,
}

impl DataFile {
    /// Open or create a data file
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(file),
            len: AtomicU64::new(len),
            sync_strategy,
        })
    }

    /// Append bytes to the end of the file
    ///
    /// The offset is taken from the file's real size, not from `len`, so
    /// bytes appended through another handle are never overlapped.
    ///
    /// The returned Location is only handed out once every byte is written
    /// (and synced, under `SyncStrategy::EveryWrite`).
    pub fn append(&self, bytes: &[u8]) -> Result<Location> {
        if bytes.is_empty() {
            return Err(StoreError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                "cannot append an empty record",
            )));
        }

        let length = u32::try_from(bytes.len()).map_err(|_| {
            StoreError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                format!("record of {} bytes exceeds the 4 GiB limit", bytes.len()),
            ))
        })?;

        let mut file = self.writer.lock();
        let offset = file.metadata()?.len();

        let written = file.write_all(bytes).and_then(|_| {
            if self.sync_strategy.syncs() {
                file.sync_data()
            } else {
                Ok(())
            }
        });

        if let Err(e) = written {
            // A partial write leaves unreachable bytes behind.
            if let Ok(meta) = file.metadata() {
                self.len.store(meta.len(), Ordering::Release);
            }
            return Err(e.into());
        }

        self.len.store(offset + length as u64, Ordering::Release);
        Ok(Location::new(offset, length))
    }

    /// Read the bytes at `location` using a fresh cursor
    pub fn read(&self, location: Location) -> Result<Vec<u8>> {
        self.reader()?.read(location)
    }

    /// Open an independent reader
    ///
    /// The reader sees every append that completed before it was created.
    pub fn reader(&self) -> Result<DataFileReader> {
        let file = File::open(&self.path)?;
        Ok(DataFileReader {
            file: BufReader::new(file),
            size: self.len(),
        })
    }

    /// Force all appended bytes to disk
    pub fn sync(&self) -> Result<()> {
        self.writer.lock().sync_all()?;
        Ok(())
    }

    /// Number of bytes written so far
    pub fn len(&self) -> u64 {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read cursor over a data file, private to one caller
pub struct DataFileReader {
    file: BufReader<File>,
    size: u64,
}

impl DataFileReader {
    /// Open a reader on an existing data file without going through a
    /// `DataFile` handle; the file is never created
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            file: BufReader::new(file),
            size,
        })
    }

    /// Read the bytes at `location`
    ///
    /// Fails with `CorruptIndex` when the range lies outside the file.
    pub fn read(&mut self, location: Location) -> Result<Vec<u8>> {
        if location.end() > self.size {
            return Err(StoreError::CorruptIndex(format!(
                "location {}+{} is past the end of the data file ({} bytes)",
                location.offset, location.length, self.size
            )));
        }

        self.file.seek(SeekFrom::Start(location.offset))?;

        let mut buf = vec![0u8; location.length as usize];
        self.file.read_exact(&mut buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => StoreError::CorruptIndex(format!(
                "data file shrank below location {}+{}",
                location.offset, location.length
            )),
            _ => StoreError::Io(e),
        })?;

        Ok(buf)
    }

    /// Size of the data file when this reader was opened
    pub fn size(&self) -> u64 {
        self.size
    }
}
