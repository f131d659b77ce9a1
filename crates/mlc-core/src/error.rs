//! # Error Types
//!
//! Canonicalization and hashing are total over the JSON data model, so the
//! only fallible operation in this crate is reading a digest back from text.

use thiserror::Error;

/// Error parsing a hex-encoded digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The text is not exactly 64 characters long.
    #[error("digest must be 64 hex chars, got {0}")]
    InvalidLength(usize),

    /// The text contains a character that is not a hex digit.
    #[error("invalid hex digit at position {position}")]
    InvalidHex {
        /// Byte offset of the first offending character.
        position: usize,
    },
}
