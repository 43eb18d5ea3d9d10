//! Inspect Module
//!
//! Offline checks of a table's files that need no record type: every
//! primary index entry must lie inside the data file and point at an intact
//! record frame.

use std::fmt;
use std::path::Path;

use crate::codec::FrameHeader;
use crate::error::{Result, StoreError};
use crate::index::load_raw;
use crate::storage::{DataFileReader, Location, TablePaths};

/// Something wrong with one primary index entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// The Location reaches past the end of the data file
    OutOfBounds { key: Vec<u8>, location: Location },

    /// The bytes at the Location are not a valid record frame
    BadFrame {
        key: Vec<u8>,
        location: Location,
        reason: String,
    },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::OutOfBounds { key, location } => write!(
                f,
                "key {:02x?}: location {}+{} is past the end of the data file",
                key, location.offset, location.length
            ),
            Problem::BadFrame {
                key,
                location,
                reason,
            } => write!(
                f,
                "key {:02x?}: bad frame at {}+{}: {}",
                key, location.offset, location.length, reason
            ),
        }
    }
}

/// Result of inspecting one table
#[derive(Debug, Clone)]
pub struct TableReport {
    pub table: String,
    pub records: usize,
    pub data_bytes: u64,
    pub live_bytes: u64,
    pub dead_bytes: u64,
    pub indexed_fields: Vec<String>,
    pub problems: Vec<Problem>,
}

impl TableReport {
    pub fn is_healthy(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Inspect table `table` stored in `dir`
///
/// Read only: nothing is created or modified. Fails with `Io` if the data
/// file is missing and with `CorruptIndex` if the primary index file cannot
/// be decoded at all; per-entry problems are collected in the report.
pub fn inspect_table(dir: &Path, table: &str) -> Result<TableReport> {
    let paths = TablePaths::new(dir, table)?;

    let mut reader = DataFileReader::open(paths.data())?;
    let data_bytes = reader.size();

    let entries = load_raw(paths.index())?;

    let mut problems = Vec::new();
    let mut live_bytes = 0u64;

    for (key, location) in &entries {
        live_bytes += location.length as u64;

        if location.end() > data_bytes {
            problems.push(Problem::OutOfBounds {
                key: key.clone(),
                location: *location,
            });
            continue;
        }

        let checked = reader
            .read(*location)
            .and_then(|bytes| FrameHeader::verify(&bytes));

        match checked {
            Ok(_) => {}
            Err(StoreError::Decoding(reason)) | Err(StoreError::CorruptIndex(reason)) => {
                problems.push(Problem::BadFrame {
                    key: key.clone(),
                    location: *location,
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(TableReport {
        table: table.to_string(),
        records: entries.len(),
        data_bytes,
        live_bytes,
        dead_bytes: data_bytes.saturating_sub(live_bytes),
        indexed_fields: paths.indexed_fields()?,
        problems,
    })
}
