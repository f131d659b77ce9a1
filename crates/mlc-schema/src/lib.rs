//! # mlc-schema — Schema Governance & Validation
//!
//! Everything the contracts toolchain knows about JSON Schema documents.
//!
//! ## Governance (`hash`, `drift`, `change`, `lint`, `audit`)
//!
//! A schema's identity is its [`structural_hash`]: the SHA-256 of its
//! canonical bytes with documentation-only root fields removed. Drift is a
//! mismatch between that hash and the accepted baseline, and
//! [`classify_change`] labels edits between two revisions as `none`,
//! `additive`, `breaking` or `other`.
//!
//! ## Baselines (`checksum`)
//!
//! [`ChecksumStore`] reads and writes the `<file>.sha256` records holding
//! accepted structural hashes.
//!
//! ## Runtime Validation (`validate`, `policy`)
//!
//! [`SchemaValidator`] validates manifests and JSON Lines records against
//! Draft 7 or Draft 2020-12 schemas with local-only `$ref` resolution.
//! [`compare_to_policy`] produces advisory data-collection warnings.
//!
//! ## Crate Policy
//!
//! - Depends only on `mlc-core` internally.
//! - Hashing, drift and classification are pure and never fail.
//! - No logging; callers decide what to report.

pub mod audit;
pub mod catalog;
pub mod change;
pub mod checksum;
pub mod drift;
pub mod error;
pub mod hash;
pub mod lint;
pub mod policy;
pub mod validate;

pub use audit::{audit_schema, extract_schema_version, SchemaAudit};
pub use catalog::{load_document, schema_files, snapshot_files, yaml_to_json_value};
pub use change::{classify_change, ChangeClass};
pub use checksum::{BaselineEntry, ChecksumBaseline, ChecksumRecord, ChecksumStore};
pub use drift::{verify_drift, DriftStatus};
pub use error::SchemaError;
pub use hash::{document_hash, strip_documentation, structural_hash, DOCUMENTATION_FIELDS};
pub use lint::{duplicate_required_entries, ensure_unique_required, DuplicateRequired};
pub use policy::compare_to_policy;
pub use validate::{
    resolve_versioned_schema, Dialect, SchemaValidationError, SchemaValidator,
    ValidationViolations, Violation,
};
