//! Index Module
//!
//! Primary and secondary indexes and their on-disk blob format.
//!
//! ## Responsibilities
//! - Primary index: identity → Location, the source of truth for which
//!   records are reachable
//! - Secondary index: field value → identities, built on demand
//! - Whole-file replacement via write-temp-then-rename

mod blob;
mod primary;
mod secondary;

pub use primary::{load_raw, PrimaryIndex, RawEntry, PRIMARY_MAGIC};
pub use secondary::{SecondaryIndex, SECONDARY_MAGIC};
