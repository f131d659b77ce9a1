//! # mlc-core — Canonical Form and Content Digests
//!
//! The leaf crate of the ml-contracts workspace. Every schema hash, drift
//! check and published manifest digest in the workspace is computed from
//! the primitives defined here.
//!
//! ## Key Design Principles
//!
//! 1. **`serde_json::Value` is the data model.** Schemas, manifests, rules
//!    and metrics documents are all handled as generic JSON trees. No
//!    schema-specific structs.
//!
//! 2. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for digests.
//!
//! 3. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that every digest path goes through canonicalization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mlc-*` crates (this is the leaf of the DAG).
//! - No I/O, no logging.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;

pub use canonical::{canonicalize, CanonicalBytes};
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::DigestError;
