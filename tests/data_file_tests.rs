//! Tests for DataFile
//!
//! These tests verify:
//! - Appends return consecutive, non-overlapping Locations
//! - Reads by Location return exactly the appended bytes
//! - Out-of-range Locations are reported as a corrupt index
//! - Reopening picks up the existing file size

use litestore::config::SyncStrategy;
use litestore::storage::{DataFile, DataFileReader, Location};
use litestore::StoreError;
use tempfile::TempDir;

fn setup_data_file() -> (TempDir, DataFile) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.dat");
    let file = DataFile::open(&path, SyncStrategy::EveryWrite).unwrap();
    (temp_dir, file)
}

#[test]
fn test_open_creates_empty_file() {
    let (temp, file) = setup_data_file();

    assert!(temp.path().join("test.dat").exists());
    assert_eq!(file.len(), 0);
    assert!(file.is_empty());
}

#[test]
fn test_append_returns_consecutive_locations() {
    let (_temp, file) = setup_data_file();

    let first = file.append(b"hello").unwrap();
    let second = file.append(b" world!").unwrap();

    assert_eq!(first, Location::new(0, 5));
    assert_eq!(second, Location::new(5, 7));
    assert_eq!(file.len(), 12);
}

#[test]
fn test_read_returns_appended_bytes() {
    let (_temp, file) = setup_data_file();

    let a = file.append(b"alpha").unwrap();
    let b = file.append(b"beta").unwrap();

    assert_eq!(file.read(b).unwrap(), b"beta");
    assert_eq!(file.read(a).unwrap(), b"alpha");
}

#[test]
fn test_empty_append_rejected() {
    let (_temp, file) = setup_data_file();

    let result = file.append(b"");

    assert!(matches!(result, Err(StoreError::Io(_))));
    assert_eq!(file.len(), 0);
}

#[test]
fn test_read_past_end_is_corrupt_index() {
    let (_temp, file) = setup_data_file();
    file.append(b"0123456789").unwrap();

    let result = file.read(Location::new(8, 5));
    assert!(matches!(result, Err(StoreError::CorruptIndex(_))));

    let result = file.read(Location::new(100, 1));
    assert!(matches!(result, Err(StoreError::CorruptIndex(_))));
}

#[test]
fn test_read_exact_end_boundary() {
    let (_temp, file) = setup_data_file();
    file.append(b"0123456789").unwrap();

    assert_eq!(file.read(Location::new(6, 4)).unwrap(), b"6789");
}

#[test]
fn test_reopen_keeps_size_and_appends_after_existing_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reopen.dat");

    let first = {
        let file = DataFile::open(&path, SyncStrategy::EveryWrite).unwrap();
        file.append(b"persisted").unwrap()
    };

    let file = DataFile::open(&path, SyncStrategy::OsBuffered).unwrap();
    assert_eq!(file.len(), 9);

    let second = file.append(b"more").unwrap();
    assert_eq!(second, Location::new(9, 4));
    assert_eq!(file.read(first).unwrap(), b"persisted");
    assert_eq!(file.read(second).unwrap(), b"more");
}

#[test]
fn test_appends_through_two_handles_never_overlap() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shared.dat");
    let a = DataFile::open(&path, SyncStrategy::EveryWrite).unwrap();
    let b = DataFile::open(&path, SyncStrategy::EveryWrite).unwrap();

    let first = a.append(b"alpha").unwrap();
    let second = b.append(b"beta").unwrap();
    let third = a.append(b"gamma").unwrap();

    assert_eq!(first, Location::new(0, 5));
    assert_eq!(second, Location::new(5, 4));
    assert_eq!(third, Location::new(9, 5));
    assert_eq!(a.read(second).unwrap(), b"beta");
    assert_eq!(b.read(third).unwrap(), b"gamma");
}

#[test]
fn test_reader_sees_appends_made_before_it_was_opened() {
    let (_temp, file) = setup_data_file();
    let a = file.append(b"one").unwrap();

    let mut early = file.reader().unwrap();
    let b = file.append(b"two").unwrap();
    let mut late = file.reader().unwrap();

    assert_eq!(early.read(a).unwrap(), b"one");
    assert!(matches!(early.read(b), Err(StoreError::CorruptIndex(_))));
    assert_eq!(late.read(b).unwrap(), b"two");
}

#[test]
fn test_standalone_reader() {
    let (temp, file) = setup_data_file();
    let location = file.append(b"standalone").unwrap();

    let mut reader = DataFileReader::open(&temp.path().join("test.dat")).unwrap();
    assert_eq!(reader.size(), 10);
    assert_eq!(reader.read(location).unwrap(), b"standalone");
}

#[test]
fn test_standalone_reader_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    let result = DataFileReader::open(&temp_dir.path().join("missing.dat"));

    assert!(matches!(result, Err(StoreError::Io(_))));
    assert!(!temp_dir.path().join("missing.dat").exists());
}
