//! # mlc-cli — Contracts Tooling for Model Promotion
//!
//! Provides the `mlc` command-line interface used by CI to keep manifest
//! schemas, their checksum baselines and the promotion rule consistent.
//!
//! ## Subcommands
//!
//! - `mlc schemas` — schema audit with drift detection.
//! - `mlc checksums` — rewrite snapshot baselines and the manifest hash artifact.
//! - `mlc manifest-hash` — print (or publish) the manifest schema hash.
//! - `mlc classify` — classify the change between two schema revisions.
//! - `mlc validate` — manifest, bars JSONL and coverage validation.
//! - `mlc fixtures` — check every manifest fixture behaves as its name says.
//! - `mlc promote` — audit the promotion rule and gate a manifest.
//! - `mlc all` — the full contracts sweep with a one-line summary.
//!
//! ```bash
//! mlc schemas
//! mlc validate manifest fixtures/export_manifest_with_policy.json --policy fixtures/policy_v1.json
//! mlc promote fixtures/model_manifest_valid.json
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` validation failure or runtime error, `2` drift or a
//! rule that fails its audit, `3` a rule that cannot be evaluated.

pub mod checksums;
pub mod classify;
pub mod config;
pub mod fixtures;
pub mod promote;
pub mod report;
pub mod schemas;
pub mod summary;
pub mod validate;

use std::path::{Path, PathBuf};

pub use config::ContractsConfig;

/// Resolve a path that may be relative to the repository root.
///
/// If the path is absolute, returns it as-is. If relative and the file
/// exists relative to `repo_root`, uses that. Otherwise returns the path
/// relative to the current directory.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}
