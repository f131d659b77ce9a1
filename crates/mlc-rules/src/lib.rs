//! # mlc-rules — Promotion Rule Engine
//!
//! Evaluates the boolean promotion rules that decide whether a candidate
//! model may be promoted, and audits those rules against the manifest
//! schema before they are trusted.
//!
//! ## Architecture
//!
//! - **Resolve** (`resolve.rs`): `{"var": "a.b.c"}` operands looked up in
//!   the manifest by dotted path.
//!
//! - **Evaluate** (`evaluate.rs`): the closed operator set `and`, `>=`,
//!   `>`, `<=`, `<`. Unknown operators are errors, never ignored.
//!
//! - **Audit** (`audit.rs`): every referenced metric must be declared by
//!   the schema section it names.
//!
//! - **Gate** (`gate.rs`): audit, then evaluate.
//!
//! ## Crate Policy
//!
//! - No internal dependencies; rules, schemas and manifests are plain
//!   `serde_json::Value` trees.
//! - Pure functions only: no I/O, no logging.

pub mod audit;
pub mod error;
pub mod evaluate;
pub mod gate;
pub mod resolve;

pub use audit::{audit_rule, referenced_variables, RuleAudit};
pub use error::RuleError;
pub use evaluate::{evaluate, Comparison};
pub use gate::{check_promotion, PromotionOutcome};
pub use resolve::resolve_operand;
