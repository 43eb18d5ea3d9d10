//! Configuration for LiteStore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a LiteStore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all table files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {table}.dat          (append-only record data)
    ///     ├── {table}.idx          (primary index)
    ///     └── {table}#{field}.idx  (secondary index, one per built field)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// When to fsync data and index files
    pub sync_strategy: SyncStrategy,
}

/// Sync strategy: how hard writes are pushed to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync the data file after every append and every index file before
    /// it replaces the previous one (safest, slowest)
    EveryWrite,

    /// Leave flushing to the OS. Data is still written before the index that
    /// references it, so a process crash cannot expose a dangling location,
    /// but a power loss may.
    OsBuffered,
}

impl SyncStrategy {
    pub(crate) fn syncs(self) -> bool {
        matches!(self, SyncStrategy::EveryWrite)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./litestore_data"),
            sync_strategy: SyncStrategy::EveryWrite,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all tables)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
