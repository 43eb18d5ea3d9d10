//! Benchmarks for LiteStore table operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use litestore::{Config, FieldValue, Record, Store, SyncStrategy, Table};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Car {
    id: u64,
    brand: String,
    model: String,
}

impl Record for Car {
    type Id = u64;
    const TABLE: &'static str = "cars";

    fn identity(&self) -> Option<u64> {
        Some(self.id)
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "brand" => Some(self.brand.as_str().into()),
            _ => None,
        }
    }
}

const BRANDS: [&str; 4] = ["Toyota", "Nissan", "Honda", "Mazda"];

fn car(id: u64) -> Car {
    Car {
        id,
        brand: BRANDS[id as usize % BRANDS.len()].to_string(),
        model: format!("model-{}", id),
    }
}

fn setup(records: u64) -> (TempDir, Table<Car>) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::OsBuffered)
        .build();
    let store = Store::open(config).unwrap();
    let table = store.table::<Car>().unwrap();
    let batch: Vec<Car> = (0..records).map(car).collect();
    table.save_all(&batch).unwrap();
    (temp_dir, table)
}

fn table_benchmarks(c: &mut Criterion) {
    c.bench_function("save_into_1k_table", |b| {
        b.iter_batched(
            || setup(1_000),
            |(_temp, table)| table.save(black_box(&car(1_000_000))).unwrap(),
            BatchSize::PerIteration,
        )
    });

    let (_temp, table) = setup(10_000);

    c.bench_function("find_by_key_10k", |b| {
        let mut id = 0u64;
        b.iter(|| {
            id = (id + 7919) % 10_000;
            black_box(table.find_by_key(&id).unwrap())
        })
    });

    table.build_index("brand").unwrap();
    c.bench_function("find_by_field_10k", |b| {
        b.iter(|| black_box(table.find_by_field("brand", "Honda").unwrap()))
    });

    c.bench_function("build_index_10k", |b| {
        b.iter(|| table.build_index("brand").unwrap())
    });
}

criterion_group!(benches, table_benchmarks);
criterion_main!(benches);
