//! Error types for LiteStore
//!
//! Every public operation either succeeds or fails with exactly one of the
//! kinds below. Nothing is retried and nothing is repaired automatically.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for LiteStore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Table '{0}' is not open")]
    NotInitialized(String),

    #[error("Table '{0}' is already open through another handle")]
    TableInUse(String),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Record for table '{0}' has no identity value")]
    NoIdentity(String),

    #[error("Unknown key in table '{table}': {key}")]
    UnknownKey { table: String, key: String },

    #[error("Unknown field '{field}' for table '{table}'")]
    UnknownField { table: String, field: String },

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("No index built for field '{field}' of table '{table}'")]
    NoSuchIndex { table: String, field: String },

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    // -------------------------------------------------------------------------
    // Naming Errors
    // -------------------------------------------------------------------------
    #[error("Invalid name '{0}': names must be non-empty and free of '#', '/', '\\' and NUL")]
    InvalidName(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
