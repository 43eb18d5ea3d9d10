//! Table file naming
//!
//! Every file a table owns is derived from the table name (and, for
//! secondary indexes, the field name):
//! - `{table}.dat`          data file
//! - `{table}.idx`          primary index
//! - `{table}#{field}.idx`  secondary index

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Extension of data files
pub const DATA_EXT: &str = "dat";

/// Extension of primary and secondary index files
pub const INDEX_EXT: &str = "idx";

/// Separates table and field names in secondary index file names
pub const INDEX_FIELD_DELIMITER: char = '#';

/// Check that a table or field name maps to a single, unambiguous file name
pub fn validate_name(name: &str) -> Result<()> {
    let bad_char = |c: char| matches!(c, '#' | '/' | '\\' | '\0');
    if name.is_empty() || name == "." || name == ".." || name.chars().any(bad_char) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Resolved file paths for one table
#[derive(Debug, Clone)]
pub struct TablePaths {
    dir: PathBuf,
    table: String,
    data: PathBuf,
    index: PathBuf,
}

impl TablePaths {
    pub fn new(dir: &Path, table: &str) -> Result<Self> {
        validate_name(table)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            table: table.to_string(),
            data: dir.join(format!("{}.{}", table, DATA_EXT)),
            index: dir.join(format!("{}.{}", table, INDEX_EXT)),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the data file
    pub fn data(&self) -> &Path {
        &self.data
    }

    /// Path of the primary index file
    pub fn index(&self) -> &Path {
        &self.index
    }

    /// Path of the secondary index file for `field`
    pub fn secondary(&self, field: &str) -> Result<PathBuf> {
        validate_name(field)?;
        Ok(self.dir.join(format!(
            "{}{}{}.{}",
            self.table, INDEX_FIELD_DELIMITER, field, INDEX_EXT
        )))
    }

    /// Fields with a secondary index file on disk, sorted by name
    pub fn indexed_fields(&self) -> Result<Vec<String>> {
        let prefix = format!("{}{}", self.table, INDEX_FIELD_DELIMITER);
        let mut fields = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(field) = Self::parse_field(&path, &prefix) {
                fields.push(field);
            }
        }

        fields.sort();
        Ok(fields)
    }

    /// "cars#brand.idx" with prefix "cars#" → Some("brand")
    fn parse_field(path: &Path, prefix: &str) -> Option<String> {
        if path.extension()?.to_str()? != INDEX_EXT {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let field = stem.strip_prefix(prefix)?;
        if field.is_empty() {
            return None;
        }
        Some(field.to_string())
    }
}

/// Sibling path used while an index file is being replaced
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
