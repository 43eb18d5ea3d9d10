//! Secondary Index
//!
//! field value → identities, for exact-match lookups on one field.
//!
//! ## Staleness
//! A secondary index is a snapshot: it reflects the table as it was when the
//! index was last built and is never updated by `save`, `update` or `delete`.
//! Rebuild it after mutating the table if the answers must be current.
//! Identities are stored instead of Locations, so a stale index still
//! resolves to the current revision of each record it names.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codec::bincode_options;
use crate::error::{Result, StoreError};
use crate::record::FieldValue;

use super::blob::{read_blob, write_blob};

/// Magic bytes identifying a secondary index file
pub const SECONDARY_MAGIC: &[u8; 4] = b"LSSI";

/// On-disk body of a secondary index file
#[derive(Debug, Serialize, Deserialize)]
struct SecondaryBody {
    field: String,
    groups: Vec<(FieldValue, Vec<Vec<u8>>)>,
}

/// Grouping of identities by the value of one field
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryIndex<K> {
    field: String,
    groups: BTreeMap<FieldValue, Vec<K>>,
}

impl<K> SecondaryIndex<K>
where
    K: Clone + Debug + Serialize + DeserializeOwned,
{
    /// Create an empty index for `field`
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            groups: BTreeMap::new(),
        }
    }

    /// Build an index from `(field value, identity)` pairs in scan order
    pub fn build<I>(field: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (FieldValue, K)>,
    {
        let mut index = Self::new(field);
        for (value, key) in pairs {
            index.insert(value, key);
        }
        index
    }

    /// Append `key` to the group for `value`
    pub fn insert(&mut self, value: FieldValue, key: K) {
        self.groups.entry(value).or_default().push(key);
    }

    /// Identities recorded for `value`, in scan order (empty if none)
    pub fn get(&self, value: &FieldValue) -> &[K] {
        self.groups.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Number of distinct field values
    pub fn value_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of identities across all groups
    pub fn entry_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Replace the index file with the current contents
    pub fn persist(&self, path: &Path, sync: bool) -> Result<()> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for (value, keys) in &self.groups {
            let mut encoded = Vec::with_capacity(keys.len());
            for key in keys {
                let bytes = bincode_options()
                    .serialize(key)
                    .map_err(|e| StoreError::Encoding(format!("index key {:?}: {}", key, e)))?;
                encoded.push(bytes);
            }
            groups.push((value.clone(), encoded));
        }

        let body = SecondaryBody {
            field: self.field.clone(),
            groups,
        };
        let bytes = bincode_options().serialize(&body).map_err(|e| {
            StoreError::Encoding(format!("secondary index '{}': {}", self.field, e))
        })?;

        write_blob(path, SECONDARY_MAGIC, self.entry_count() as u64, &bytes, sync)
    }

    /// Load the index file for `field`
    ///
    /// Returns `Ok(None)` when the file does not exist, so the caller can
    /// tell "never indexed" apart from "indexed, nothing matched".
    /// A zero-length file is an empty index.
    pub fn load(path: &Path, field: &str) -> Result<Option<Self>> {
        let blob = match read_blob(path, SECONDARY_MAGIC)? {
            None => return Ok(None),
            Some(blob) if blob.is_empty() => return Ok(Some(Self::new(field))),
            Some(blob) => blob,
        };

        let corrupt =
            |msg: String| StoreError::CorruptIndex(format!("{}: {}", path.display(), msg));

        let body: SecondaryBody = bincode_options()
            .deserialize(&blob.body)
            .map_err(|e| corrupt(format!("undecodable body: {}", e)))?;

        if body.field != field {
            return Err(corrupt(format!(
                "file indexes field '{}', expected '{}'",
                body.field, field
            )));
        }

        let mut groups = BTreeMap::new();
        let mut count = 0u64;
        for (value, encoded) in body.groups {
            let mut keys = Vec::with_capacity(encoded.len());
            for bytes in encoded {
                let key: K = bincode_options()
                    .deserialize(&bytes)
                    .map_err(|e| corrupt(format!("undecodable key: {}", e)))?;
                keys.push(key);
            }
            count += keys.len() as u64;
            groups.insert(value, keys);
        }

        if count != blob.entry_count {
            return Err(corrupt(format!(
                "header says {} entries, body has {}",
                blob.entry_count, count
            )));
        }

        Ok(Some(Self {
            field: body.field,
            groups,
        }))
    }
}
