//! Store Module
//!
//! Entry point that binds a root directory to table handles.
//!
//! The store holds no open tables itself: each call to [`Store::table`]
//! returns an already opened [`Table`] that the caller owns. A table is open
//! through at most one handle at a time, so asking for a table that is
//! still open elsewhere fails with `TableInUse`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::codec::{BincodeCodec, Codec};
use crate::config::Config;
use crate::error::Result;
use crate::record::Record;
use crate::storage::{TablePaths, DATA_EXT};
use crate::table::Table;

/// A directory of tables
#[derive(Debug, Clone)]
pub struct Store {
    config: Config,
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// Creates the data directory if it does not exist.
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        info!(data_dir = %config.data_dir.display(), "store opened");
        Ok(Self { config })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Open the table for `R` under its canonical name `R::TABLE`
    ///
    /// Fails with `TableInUse` if the table is already open.
    pub fn table<R: Record>(&self) -> Result<Table<R>> {
        self.table_named(R::TABLE)
    }

    /// Open the table for `R` under an explicit name
    pub fn table_named<R: Record>(&self, name: &str) -> Result<Table<R>> {
        self.table_with_codec(name, BincodeCodec::new())
    }

    /// Open the table for `R` with a custom codec
    pub fn table_with_codec<R: Record, C: Codec>(&self, name: &str, codec: C) -> Result<Table<R, C>> {
        let table = self.unopened_table_with_codec(name, codec)?;
        table.open()?;
        Ok(table)
    }

    /// Create a handle without opening it
    pub fn unopened_table<R: Record>(&self, name: &str) -> Result<Table<R>> {
        self.unopened_table_with_codec(name, BincodeCodec::new())
    }

    fn unopened_table_with_codec<R: Record, C: Codec>(
        &self,
        name: &str,
        codec: C,
    ) -> Result<Table<R, C>> {
        let paths = TablePaths::new(&self.config.data_dir, name)?;
        Ok(Table::new(paths, self.config.sync_strategy, codec))
    }

    /// Names of every table with a data file in this store, sorted
    pub fn tables(&self) -> Result<Vec<String>> {
        list_tables(&self.config.data_dir)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Names of every table with a data file in `dir`, sorted
pub fn list_tables(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path: PathBuf = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(DATA_EXT) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }

    names.sort();
    Ok(names)
}
