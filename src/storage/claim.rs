//! Open-table claims
//!
//! A table may be open through at most one handle per process. Opening a
//! table claims its data file (by canonical path, so two stores rooted at
//! the same directory see the same claim); dropping the claim releases it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{const_mutex, Mutex};
use tracing::debug;

use crate::error::{Result, StoreError};

/// Canonical data file paths of every open table in this process
static OPEN_TABLES: Mutex<BTreeSet<PathBuf>> = const_mutex(BTreeSet::new());

/// Exclusive claim on one table, held for as long as the table is open
#[derive(Debug)]
pub struct TableClaim {
    path: PathBuf,
}

impl TableClaim {
    /// Claim the table whose data file is `data_path`
    ///
    /// The data file must already exist. Fails with `TableInUse` if another
    /// handle holds the claim.
    pub fn acquire(data_path: &Path, table: &str) -> Result<Self> {
        let path = fs::canonicalize(data_path)?;

        if !OPEN_TABLES.lock().insert(path.clone()) {
            return Err(StoreError::TableInUse(table.to_string()));
        }

        debug!(path = %path.display(), "table claimed");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TableClaim {
    fn drop(&mut self) {
        OPEN_TABLES.lock().remove(&self.path);
    }
}
