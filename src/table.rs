//! Table Module
//!
//! The table façade that coordinates codec, data file and indexes.
//!
//! ## Responsibilities
//! - Own the `Unopened → Open → Closed` lifecycle
//! - Expose save / find / update / delete on typed records
//! - Keep the data file and the primary index consistent: data is always
//!   appended before the index that points at it is persisted
//! - Build and query secondary indexes on demand

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::codec::{BincodeCodec, Codec};
use crate::config::SyncStrategy;
use crate::error::{Result, StoreError};
use crate::index::{PrimaryIndex, SecondaryIndex};
use crate::record::{FieldValue, Record};
use crate::storage::{DataFile, DataFileReader, Location, TableClaim, TablePaths};

/// Space accounting for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Reachable records
    pub records: usize,
    /// Size of the data file
    pub data_bytes: u64,
    /// Bytes of reachable record revisions
    pub live_bytes: u64,
    /// Bytes of superseded or deleted revisions
    pub dead_bytes: u64,
}

/// Lifecycle of a table handle
enum Lifecycle<K> {
    Unopened,
    Open(OpenTable<K>),
    Closed,
}

/// Resources held while a table is open
struct OpenTable<K> {
    data: Arc<DataFile>,
    index: PrimaryIndex<K>,
    _claim: TableClaim,
}

/// A pending change to the primary index
enum IndexEdit<K> {
    Put(K, Location),
    Remove(K),
}

/// A handle on one table
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (save/update/delete/build_index/open/close): serialized by
///   `write_lock`. The record is appended to the data file first; a copy of
///   the primary index is then edited and persisted, and swapped in under a
///   short exclusive hold of `state` once it is on disk.
///
/// - **Reads** (find_by_key/find_all/find_by_field): take a shared hold of
///   `state` only long enough to copy out Locations, then read the data file
///   through a private cursor with no lock held.
///
/// Different tables share nothing and run fully in parallel. A table can be
/// open through only one handle at a time; opening a second handle on it
/// fails with `TableInUse` until the first is closed or dropped.
pub struct Table<R: Record, C: Codec = BincodeCodec> {
    /// File names derived from the table name
    paths: TablePaths,

    /// Durability policy for data and index files
    sync_strategy: SyncStrategy,

    /// Record encoder / decoder
    codec: C,

    /// Lifecycle state and, while open, the data file and primary index
    state: RwLock<Lifecycle<R::Id>>,

    /// Serializes write operations
    write_lock: Mutex<()>,

    _record: PhantomData<fn() -> R>,
}

impl<R: Record, C: Codec> Table<R, C> {
    /// Create an unopened handle for table `name` stored under `paths.dir()`
    pub fn new(paths: TablePaths, sync_strategy: SyncStrategy, codec: C) -> Self {
        Self {
            paths,
            sync_strategy,
            codec,
            state: RwLock::new(Lifecycle::Unopened),
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the table
    ///
    /// Creates the data and index files if they do not exist and loads the
    /// primary index. Opening an open table is a no-op; opening a closed
    /// table reloads everything from disk. Fails with `TableInUse` if another
    /// handle has the table open.
    pub fn open(&self) -> Result<()> {
        let _write_guard = self.write_lock.lock();

        if matches!(*self.state.read(), Lifecycle::Open(_)) {
            return Ok(());
        }

        let data = DataFile::open(self.paths.data(), self.sync_strategy)?;
        let claim = TableClaim::acquire(self.paths.data(), self.name())?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.index())?;

        let index = PrimaryIndex::load(self.paths.index())?;

        info!(
            table = self.name(),
            records = index.len(),
            data_bytes = data.len(),
            "table opened"
        );

        *self.state.write() = Lifecycle::Open(OpenTable {
            data: Arc::new(data),
            index,
            _claim: claim,
        });

        Ok(())
    }

    /// Close the table
    ///
    /// Syncs the data file and releases the table for other handles. Every
    /// later operation except `open` fails with `NotInitialized`.
    pub fn close(&self) -> Result<()> {
        let _write_guard = self.write_lock.lock();

        let mut state = self.state.write();
        match &*state {
            Lifecycle::Open(open) => open.data.sync()?,
            _ => return Err(self.not_initialized()),
        }
        *state = Lifecycle::Closed;

        info!(table = self.name(), "table closed");
        Ok(())
    }

    /// Whether the table is currently open
    pub fn is_open(&self) -> bool {
        matches!(*self.state.read(), Lifecycle::Open(_))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Save a record
    ///
    /// Steps:
    /// 1. Extract the identity (`NoIdentity` if there is none)
    /// 2. Encode and append to the data file
    /// 3. Point the identity at the new Location and persist the index
    ///
    /// Saving an identity that already exists replaces it.
    pub fn save(&self, record: &R) -> Result<()> {
        self.ensure_open()?;
        let id = self.identity_of(record)?;
        let bytes = self.codec.encode(record)?;

        let _write_guard = self.write_lock.lock();
        let data = self.data_file()?;

        let location = data.append(&bytes)?;
        self.commit(vec![IndexEdit::Put(id.clone(), location)])?;

        debug!(table = self.name(), id = ?id, offset = location.offset, length = location.length, "saved");
        Ok(())
    }

    /// Save a batch of records, persisting the index once
    ///
    /// Every record is encoded before anything is written, so a record
    /// without identity or one that fails to encode leaves the table as it
    /// was. Returns the number of records saved.
    pub fn save_all<'a, I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        self.ensure_open()?;

        let mut encoded = Vec::new();
        for record in records {
            let id = self.identity_of(record)?;
            encoded.push((id, self.codec.encode(record)?));
        }
        if encoded.is_empty() {
            return Ok(0);
        }

        let _write_guard = self.write_lock.lock();
        let data = self.data_file()?;

        let mut edits = Vec::with_capacity(encoded.len());
        for (id, bytes) in encoded {
            let location = data.append(&bytes)?;
            edits.push(IndexEdit::Put(id, location));
        }

        let count = edits.len();
        self.commit(edits)?;

        debug!(table = self.name(), count, "saved batch");
        Ok(count)
    }

    /// Replace the record stored under `id`
    ///
    /// The new revision is appended and the index repointed; the old bytes
    /// are never overwritten. If `record` carries a different identity, the
    /// entry for `id` is removed and the record is indexed under its new
    /// identity (replacing any record already stored there).
    pub fn update(&self, id: &R::Id, record: &R) -> Result<()> {
        self.ensure_open()?;
        let new_id = self.identity_of(record)?;
        let bytes = self.codec.encode(record)?;

        let _write_guard = self.write_lock.lock();
        if !self.read_open(|open| Ok(open.index.contains_key(id)))? {
            return Err(self.unknown_key(id));
        }
        let data = self.data_file()?;

        let location = data.append(&bytes)?;

        let mut edits = Vec::with_capacity(2);
        if &new_id != id {
            edits.push(IndexEdit::Remove(id.clone()));
        }
        edits.push(IndexEdit::Put(new_id.clone(), location));
        self.commit(edits)?;

        debug!(table = self.name(), id = ?id, new_id = ?new_id, offset = location.offset, "updated");
        Ok(())
    }

    /// Delete the record stored under `id`
    ///
    /// Deleting an unknown identity is a no-op. Returns whether an entry was
    /// removed. The record's bytes stay in the data file as dead space.
    pub fn delete(&self, id: &R::Id) -> Result<bool> {
        self.ensure_open()?;

        let _write_guard = self.write_lock.lock();
        if !self.read_open(|open| Ok(open.index.contains_key(id)))? {
            debug!(table = self.name(), id = ?id, "delete of unknown key ignored");
            return Ok(false);
        }

        self.commit(vec![IndexEdit::Remove(id.clone())])?;

        debug!(table = self.name(), id = ?id, "deleted");
        Ok(true)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Find a record by identity; `None` if the identity is unknown
    ///
    /// Fails with `CorruptIndex` if the stored record carries another identity.
    pub fn find_by_key(&self, id: &R::Id) -> Result<Option<R>> {
        let found = self.read_open(|open| match open.index.get(id) {
            Some(location) => Ok(Some((open.data.reader()?, location))),
            None => Ok(None),
        })?;

        match found {
            Some((mut reader, location)) => {
                self.decode_entry(&mut reader, id, location).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Every reachable record, in ascending identity order
    pub fn find_all(&self) -> Result<Vec<R>> {
        let (mut reader, entries) = self.read_open(|open| {
            Ok((open.data.reader()?, self.entries(open)))
        })?;

        entries
            .iter()
            .map(|(id, location)| self.decode_entry(&mut reader, id, *location))
            .collect()
    }

    /// Whether a record is stored under `id`
    pub fn contains_key(&self, id: &R::Id) -> Result<bool> {
        self.read_open(|open| Ok(open.index.contains_key(id)))
    }

    /// Number of reachable records
    pub fn len(&self) -> Result<usize> {
        self.read_open(|open| Ok(open.index.len()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }

    /// Live / dead byte accounting
    pub fn stats(&self) -> Result<TableStats> {
        self.read_open(|open| {
            let data_bytes = open.data.len();
            let live_bytes = open.index.live_bytes();
            Ok(TableStats {
                records: open.index.len(),
                data_bytes,
                live_bytes,
                dead_bytes: data_bytes.saturating_sub(live_bytes),
            })
        })
    }

    // =========================================================================
    // Secondary Indexes
    // =========================================================================

    /// Build (or rebuild) the secondary index on `field`
    ///
    /// Scans every reachable record and groups identities by the field's
    /// value. The result is a snapshot: later writes do not update it.
    /// Returns the number of records indexed.
    pub fn build_index(&self, field: &str) -> Result<usize> {
        self.ensure_open()?;
        let path = self.paths.secondary(field)?;

        let _write_guard = self.write_lock.lock();
        let (mut reader, entries) = self.read_open(|open| {
            Ok((open.data.reader()?, self.entries(open)))
        })?;

        let mut index = SecondaryIndex::new(field);
        for (id, location) in entries {
            let record = self.decode_entry(&mut reader, &id, location)?;
            let value = record.field(field).ok_or_else(|| StoreError::UnknownField {
                table: self.name().to_string(),
                field: field.to_string(),
            })?;
            index.insert(value, id);
        }

        index.persist(&path, self.sync_strategy.syncs())?;

        info!(
            table = self.name(),
            field,
            records = index.entry_count(),
            values = index.value_count(),
            "secondary index built"
        );
        Ok(index.entry_count())
    }

    /// Records whose `field` equalled `value` when the index was last built
    ///
    /// Fails with `NoSuchIndex` if `field` was never indexed; returns an
    /// empty vector if it was indexed and nothing matched. Each identity is
    /// resolved through the current primary index, so records deleted since
    /// the build are skipped and updated records come back in their current
    /// revision.
    pub fn find_by_field(&self, field: &str, value: impl Into<FieldValue>) -> Result<Vec<R>> {
        self.ensure_open()?;
        let path = self.paths.secondary(field)?;
        let value = value.into();

        let index = SecondaryIndex::<R::Id>::load(&path, field)?.ok_or_else(|| {
            StoreError::NoSuchIndex {
                table: self.name().to_string(),
                field: field.to_string(),
            }
        })?;

        let ids = index.get(&value);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (mut reader, entries) = self.read_open(|open| {
            let mut entries = Vec::with_capacity(ids.len());
            for id in ids {
                match open.index.get(id) {
                    Some(location) => entries.push((id, location)),
                    None => warn!(
                        table = self.name(),
                        field,
                        id = ?id,
                        "stale secondary index entry skipped"
                    ),
                }
            }
            Ok((open.data.reader()?, entries))
        })?;

        entries
            .into_iter()
            .map(|(id, location)| self.decode_entry(&mut reader, id, location))
            .collect()
    }

    /// Remove the secondary index on `field`
    pub fn drop_index(&self, field: &str) -> Result<()> {
        self.ensure_open()?;
        let path = self.paths.secondary(field)?;

        let _write_guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(table = self.name(), field, "secondary index dropped");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NoSuchIndex {
                table: self.name().to_string(),
                field: field.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Fields that currently have a secondary index on disk
    pub fn indexed_fields(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        self.paths.indexed_fields()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Table name
    pub fn name(&self) -> &str {
        self.paths.table()
    }

    /// Files owned by this table
    pub fn paths(&self) -> &TablePaths {
        &self.paths
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Run `f` against the open table under a shared hold of `state`
    fn read_open<T>(&self, f: impl FnOnce(&OpenTable<R::Id>) -> Result<T>) -> Result<T> {
        match &*self.state.read() {
            Lifecycle::Open(open) => f(open),
            Lifecycle::Unopened | Lifecycle::Closed => Err(self.not_initialized()),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        self.read_open(|_| Ok(()))
    }

    fn data_file(&self) -> Result<Arc<DataFile>> {
        self.read_open(|open| Ok(Arc::clone(&open.data)))
    }

    /// Apply `edits` to a copy of the primary index, persist the copy and
    /// swap it in
    ///
    /// Must be called with `write_lock` held and after the data the edits
    /// point at has been appended. Readers keep using the current index while
    /// the copy is written; if persisting fails the current index is left as
    /// it was, so memory never runs ahead of disk.
    fn commit(&self, edits: Vec<IndexEdit<R::Id>>) -> Result<()> {
        let mut next = self.read_open(|open| Ok(open.index.clone()))?;

        for edit in edits {
            match edit {
                IndexEdit::Put(id, location) => {
                    next.put(id, location);
                }
                IndexEdit::Remove(id) => {
                    next.remove(&id);
                }
            }
        }

        next.persist(self.paths.index(), self.sync_strategy.syncs())?;

        match &mut *self.state.write() {
            Lifecycle::Open(open) => {
                open.index = next;
                Ok(())
            }
            Lifecycle::Unopened | Lifecycle::Closed => Err(self.not_initialized()),
        }
    }

    /// Identity and Location of every entry, in identity order
    fn entries(&self, open: &OpenTable<R::Id>) -> Vec<(R::Id, Location)> {
        open.index.iter().map(|(id, location)| (id.clone(), *location)).collect()
    }

    /// Decode the record stored for `id` and check that it is the one asked for
    ///
    /// An entry that points at another record's frame is reported as
    /// `CorruptIndex`.
    fn decode_entry(
        &self,
        reader: &mut DataFileReader,
        id: &R::Id,
        location: Location,
    ) -> Result<R> {
        let record = self.decode_at(reader, location)?;
        let stored = record.identity();

        if stored.as_ref() != Some(id) {
            return Err(StoreError::CorruptIndex(format!(
                "table '{}': entry {:?} at {}+{} holds the record of {:?}",
                self.name(),
                id,
                location.offset,
                location.length,
                stored
            )));
        }

        Ok(record)
    }

    fn decode_at(&self, reader: &mut DataFileReader, location: Location) -> Result<R> {
        let bytes = reader.read(location)?;
        self.codec.decode(&bytes)
    }

    fn identity_of(&self, record: &R) -> Result<R::Id> {
        record
            .identity()
            .ok_or_else(|| StoreError::NoIdentity(self.name().to_string()))
    }

    fn not_initialized(&self) -> StoreError {
        StoreError::NotInitialized(self.name().to_string())
    }

    fn unknown_key(&self, id: &R::Id) -> StoreError {
        StoreError::UnknownKey {
            table: self.name().to_string(),
            key: format!("{:?}", id),
        }
    }
}
