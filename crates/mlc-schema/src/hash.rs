//! # Structural Hash
//!
//! A schema's identity for governance purposes. Documentation-only root
//! fields are stripped before hashing so that wording fixes never register
//! as drift, while every structural edit does.

use mlc_core::{sha256_digest, CanonicalBytes, ContentDigest};
use serde_json::Value;

/// Root-level keys that carry documentation only and never affect identity.
pub const DOCUMENTATION_FIELDS: [&str; 3] = ["title", "description", "$id"];

/// Return a copy of `schema` with the documentation-only root keys removed.
///
/// Only the top level is stripped; a nested `description` is part of the
/// structure. Non-object schemas are returned unchanged.
pub fn strip_documentation(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !DOCUMENTATION_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Compute the structural hash of a schema.
///
/// Invariant under key reordering at any depth and under edits confined to
/// [`DOCUMENTATION_FIELDS`]. Sensitive to every other change.
pub fn structural_hash(schema: &Value) -> ContentDigest {
    sha256_digest(&CanonicalBytes::new(&strip_documentation(schema)))
}

/// Compute the digest of the whole document, documentation included.
///
/// This is the hash published alongside the manifest schema for downstream
/// consumers that pin the exact document they validate against.
pub fn document_hash(document: &Value) -> ContentDigest {
    sha256_digest(&CanonicalBytes::new(document))
}
