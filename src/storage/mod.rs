//! Storage Module
//!
//! Append-only data files and the byte locations that address them.
//!
//! ## Responsibilities
//! - Append encoded records, returning where they landed
//! - Random-access reads by offset + length
//! - Derive every per-table file name from the table name
//! - Keep each table open through at most one handle per process
//!
//! ## Data File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Record frame 1 (see codec module)      │
//! ├────────────────────────────────────────┤
//! │ Record frame 2                         │
//! ├────────────────────────────────────────┤
//! │ ... (append only, never rewritten)     │
//! └────────────────────────────────────────┘
//! ```
//! Superseded and deleted revisions stay in place as dead bytes; only the
//! primary index decides what is reachable.

mod claim;
mod data_file;
mod paths;

pub use claim::TableClaim;
pub use data_file::{DataFile, DataFileReader};
pub use paths::{validate_name, TablePaths, DATA_EXT, INDEX_EXT, INDEX_FIELD_DELIMITER};
pub(crate) use paths::temp_path;

use serde::{Deserialize, Serialize};

/// A contiguous byte range inside a table's data file
///
/// Immutable: a new revision of a record always gets a new Location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub offset: u64,
    pub length: u32,
}

impl Location {
    pub fn new(offset: u64, length: u32) -> Self {
        Self { offset, length }
    }

    /// First byte past the end of this range
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length as u64)
    }
}
