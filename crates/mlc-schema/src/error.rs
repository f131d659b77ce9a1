//! # Error Types
//!
//! Errors raised while loading and governing schema documents. Validation
//! of instances against schemas has its own taxonomy in
//! [`crate::validate::SchemaValidationError`].

use std::path::PathBuf;

use thiserror::Error;

/// Error from schema governance operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A `required` array lists the same property twice.
    #[error("duplicate entry '{name}' in required array at {pointer}")]
    DuplicateRequiredEntry {
        /// Pointer to the object owning the `required` array.
        pointer: String,
        /// The repeated property name.
        name: String,
    },

    /// A checksum record file could not be read or parsed.
    #[error("checksum record {path}: {reason}")]
    ChecksumRecord {
        /// The record file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A JSON or YAML document could not be loaded.
    #[error("cannot load {path}: {reason}")]
    DocumentLoad {
        /// The document file.
        path: PathBuf,
        /// Read or parse failure detail.
        reason: String,
    },

    /// Filesystem error outside of a specific document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
