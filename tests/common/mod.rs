//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use litestore::{BincodeCodec, Codec, Config, FieldValue, Record, Store, SyncStrategy, Table};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

// =============================================================================
// Record Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: u32,
    pub brand: String,
    pub model: String,
}

impl Car {
    pub fn new(id: u32, brand: &str, model: &str) -> Self {
        Self {
            id,
            brand: brand.to_string(),
            model: model.to_string(),
        }
    }
}

impl Record for Car {
    type Id = u32;
    const TABLE: &'static str = "cars";

    fn identity(&self) -> Option<u32> {
        Some(self.id)
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "brand" => Some(self.brand.as_str().into()),
            "model" => Some(self.model.as_str().into()),
            _ => None,
        }
    }
}

/// A record keyed by a string, with an optional identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub email: Option<String>,
    pub name: String,
    pub age: Option<u8>,
}

impl Customer {
    pub fn new(email: &str, name: &str, age: Option<u8>) -> Self {
        Self {
            email: Some(email.to_string()),
            name: name.to_string(),
            age,
        }
    }
}

impl Record for Customer {
    type Id = String;
    const TABLE: &'static str = "customers";

    fn identity(&self) -> Option<String> {
        self.email.clone()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => Some(self.name.as_str().into()),
            "age" => Some(self.age.into()),
            _ => None,
        }
    }
}

// =============================================================================
// Codecs
// =============================================================================

/// Bincode codec that counts how often it runs
#[derive(Debug, Clone, Default)]
pub struct CountingCodec {
    inner: BincodeCodec,
    pub encoded: Arc<AtomicUsize>,
    pub decoded: Arc<AtomicUsize>,
}

impl Codec for CountingCodec {
    fn encode<R: Record>(&self, record: &R) -> litestore::Result<Vec<u8>> {
        self.encoded.fetch_add(1, Ordering::SeqCst);
        self.inner.encode(record)
    }

    fn decode<R: Record>(&self, bytes: &[u8]) -> litestore::Result<R> {
        self.decoded.fetch_add(1, Ordering::SeqCst);
        self.inner.decode(bytes)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

pub fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    let store = Store::open(config).unwrap();
    (temp_dir, store)
}

pub fn setup_cars() -> (TempDir, Store, Table<Car>) {
    let (temp_dir, store) = setup_temp_store();
    let cars = store.table::<Car>().unwrap();
    (temp_dir, store, cars)
}

/// Sort by identity so tests never depend on iteration order
pub fn sorted_ids(cars: &[Car]) -> Vec<u32> {
    let mut ids: Vec<u32> = cars.iter().map(|c| c.id).collect();
    ids.sort();
    ids
}
