//! Primary Index
//!
//! identity → Location, fully in memory, persisted as a single blob.
//!
//! Keys are stored on disk as their own bincode encoding next to the
//! Location, so the file can be inspected without knowing the key type.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::bincode_options;
use crate::error::{Result, StoreError};
use crate::storage::Location;

use super::blob::{read_blob, write_blob};

/// Magic bytes identifying a primary index file
pub const PRIMARY_MAGIC: &[u8; 4] = b"LSPI";

/// One persisted entry: encoded identity and its Location
pub type RawEntry = (Vec<u8>, Location);

/// In-memory primary index of one table
///
/// Iterates in ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryIndex<K> {
    entries: BTreeMap<K, Location>,
}

impl<K> Default for PrimaryIndex<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K> PrimaryIndex<K>
where
    K: Ord + Clone + Debug + Serialize + DeserializeOwned,
{
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index file
    ///
    /// A missing or zero-length file is an empty index; anything else that
    /// fails to decode is `CorruptIndex`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for (key_bytes, location) in load_raw(path)? {
            let key: K = bincode_options().deserialize(&key_bytes).map_err(|e| {
                StoreError::CorruptIndex(format!(
                    "{}: undecodable key: {}",
                    path.display(),
                    e
                ))
            })?;
            entries.insert(key, location);
        }

        Ok(Self { entries })
    }

    /// Replace the index file with the current contents
    pub fn persist(&self, path: &Path, sync: bool) -> Result<()> {
        let mut raw: Vec<RawEntry> = Vec::with_capacity(self.entries.len());
        for (key, location) in &self.entries {
            let key_bytes = bincode_options()
                .serialize(key)
                .map_err(|e| StoreError::Encoding(format!("index key {:?}: {}", key, e)))?;
            raw.push((key_bytes, *location));
        }

        let body = bincode_options()
            .serialize(&raw)
            .map_err(|e| StoreError::Encoding(format!("primary index: {}", e)))?;

        write_blob(path, PRIMARY_MAGIC, raw.len() as u64, &body, sync)
    }

    pub fn get(&self, key: &K) -> Option<Location> {
        self.entries.get(key).copied()
    }

    /// Point `key` at `location`, returning the previous Location
    pub fn put(&mut self, key: K, location: Location) -> Option<Location> {
        self.entries.insert(key, location)
    }

    pub fn remove(&mut self, key: &K) -> Option<Location> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Location)> {
        self.entries.iter()
    }

    /// Sum of the lengths of every reachable record
    pub fn live_bytes(&self) -> u64 {
        self.entries.values().map(|l| l.length as u64).sum()
    }
}

/// Load the raw entries of a primary index file without decoding keys
pub fn load_raw(path: &Path) -> Result<Vec<RawEntry>> {
    let blob = match read_blob(path, PRIMARY_MAGIC)? {
        Some(blob) if !blob.is_empty() => blob,
        _ => return Ok(Vec::new()),
    };

    let raw: Vec<RawEntry> = bincode_options().deserialize(&blob.body).map_err(|e| {
        StoreError::CorruptIndex(format!("{}: undecodable body: {}", path.display(), e))
    })?;

    if raw.len() as u64 != blob.entry_count {
        return Err(StoreError::CorruptIndex(format!(
            "{}: header says {} entries, body has {}",
            path.display(),
            blob.entry_count,
            raw.len()
        )));
    }

    Ok(raw)
}
