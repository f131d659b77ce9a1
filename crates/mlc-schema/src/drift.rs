//! # Drift Detection
//!
//! Compares a schema's current structural hash with the last accepted
//! baseline. Persistence of the baseline belongs to [`crate::checksum`].

use mlc_core::ContentDigest;
use serde::Serialize;
use serde_json::Value;

use crate::hash::structural_hash;

/// Outcome of a drift check for a single schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriftStatus {
    /// True when a baseline exists and differs from the current hash.
    pub drifted: bool,
    /// The structural hash computed just now.
    pub current: ContentDigest,
    /// The stored baseline, if one was recorded.
    pub baseline: Option<ContentDigest>,
}

impl DriftStatus {
    /// True when no baseline existed and `current` should become one.
    pub fn is_first_baseline(&self) -> bool {
        self.baseline.is_none()
    }
}

/// Check `schema` against an optional stored structural hash.
///
/// With no baseline the schema is never considered drifted; the returned
/// `current` digest is what the caller should persist.
pub fn verify_drift(schema: &Value, stored: Option<&ContentDigest>) -> DriftStatus {
    let current = structural_hash(schema);
    DriftStatus {
        drifted: stored.is_some_and(|s| *s != current),
        current,
        baseline: stored.copied(),
    }
}
