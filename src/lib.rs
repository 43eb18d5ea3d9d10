//! # LiteStore
//!
//! An embedded, single-process object store with:
//! - An append-only data file per table
//! - An in-memory primary index (identity → byte location) mirrored to disk
//! - On-demand secondary indexes for exact-match field lookups
//! - Single-writer/multi-reader concurrency per table
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                               │
//! │                 (root directory + config)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ table::<R>()
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Table<R>                               │
//! │            (Single Writer / Multi Reader)                    │
//! └──────┬──────────────┬──────────────────┬────────────────────┘
//!        │              │                  │
//!        ▼              ▼                  ▼
//!  ┌───────────┐  ┌─────────────┐  ┌───────────────────┐
//!  │   Codec   │  │  DataFile   │  │  Primary Index    │
//!  │ (bincode) │  │  (.dat)     │  │  (.idx, in RAM)   │
//!  └───────────┘  └─────────────┘  └─────────┬─────────┘
//!                                            │
//!                                            ▼
//!                                  ┌───────────────────┐
//!                                  │ Secondary Indexes │
//!                                  │ (table#field.idx) │
//!                                  └───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use litestore::{FieldValue, Record, Store};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Car {
//!     id: u32,
//!     brand: String,
//! }
//!
//! impl Record for Car {
//!     type Id = u32;
//!     const TABLE: &'static str = "cars";
//!
//!     fn identity(&self) -> Option<u32> {
//!         Some(self.id)
//!     }
//!
//!     fn field(&self, name: &str) -> Option<FieldValue> {
//!         match name {
//!             "brand" => Some(self.brand.as_str().into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! # fn main() -> litestore::Result<()> {
//! let store = Store::open_path(std::path::Path::new("./data"))?;
//! let cars = store.table::<Car>()?;
//!
//! cars.save(&Car { id: 1, brand: "Toyota".into() })?;
//! cars.build_index("brand")?;
//! let toyotas = cars.find_by_field("brand", "Toyota")?;
//! assert_eq!(toyotas.len(), 1);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod codec;
pub mod storage;
pub mod index;
pub mod table;
pub mod store;
pub mod inspect;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, SyncStrategy};
pub use record::{FieldValue, Record};
pub use codec::{BincodeCodec, Codec};
pub use storage::Location;
pub use table::{Table, TableStats};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LiteStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
