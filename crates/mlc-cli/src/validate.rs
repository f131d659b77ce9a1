//! # Validate Subcommand
//!
//! Runtime validation of the documents the pipeline exchanges:
//!
//! - `mlc validate manifest PATH [--policy P]` checks a model manifest
//!   against the manifest schema version it declares, then compares its
//!   data-collection block with the policy. Policy differences are
//!   warnings only.
//! - `mlc validate jsonl PATH` checks every record of a bars download
//!   manifest.
//! - `mlc validate coverage PATH` checks a bars coverage manifest.
//!
//! Exit `0` when the document conforms, `1` when it does not.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use mlc_schema::catalog::file_name;
use mlc_schema::{
    compare_to_policy, load_document, resolve_versioned_schema, SchemaValidationError,
    SchemaValidator,
};

use crate::config::ContractsConfig;
use crate::resolve_path;

/// Default schema for `mlc validate jsonl`.
pub const BARS_DOWNLOAD_SCHEMA: &str = "bars_download_manifest.schema.json";
/// Default schema for `mlc validate coverage`.
pub const BARS_COVERAGE_SCHEMA: &str = "bars_coverage_manifest.schema.json";

/// Arguments for the `mlc validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(subcommand)]
    pub target: ValidateTarget,
}

/// What kind of document to validate.
#[derive(Subcommand, Debug)]
pub enum ValidateTarget {
    /// Validate a model manifest, optionally comparing it with a policy.
    Manifest(ManifestArgs),
    /// Validate a bars download manifest in JSON Lines form.
    Jsonl(DocumentArgs),
    /// Validate a bars coverage manifest.
    Coverage(DocumentArgs),
}

/// Arguments for `mlc validate manifest`.
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Manifest to validate.
    pub path: PathBuf,

    /// Data-collection policy to compare against.
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Schema to validate against. Defaults to the configured manifest schema.
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

/// Arguments shared by the JSONL and coverage validators.
#[derive(Args, Debug)]
pub struct DocumentArgs {
    /// Document to validate.
    pub path: PathBuf,

    /// Schema to validate against.
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &ContractsConfig) -> Result<u8> {
    let registry = load_registry(&config.schema_dir)?;
    match &args.target {
        ValidateTarget::Manifest(m) => validate_manifest(m, &registry, config),
        ValidateTarget::Jsonl(d) => validate_jsonl(d, &registry, config),
        ValidateTarget::Coverage(d) => validate_coverage(d, &registry, config),
    }
}

/// The schema registry used for local `$ref` resolution.
///
/// A missing schema directory yields an empty registry.
pub(crate) fn load_registry(schema_dir: &Path) -> Result<SchemaValidator> {
    if !schema_dir.is_dir() {
        tracing::warn!(dir = %schema_dir.display(), "schema directory not found, $ref resolution disabled");
        return Ok(SchemaValidator::empty());
    }
    let validator = SchemaValidator::new(schema_dir).context("failed to load JSON schemas")?;
    tracing::debug!(schema_count = validator.schema_count(), "loaded schema registry");
    Ok(validator)
}

fn schema_path(arg: Option<&Path>, default: PathBuf, config: &ContractsConfig) -> PathBuf {
    arg.map(|p| resolve_path(p, &config.root)).unwrap_or(default)
}

/// Print violations and map a validation failure to exit code 1.
fn report_outcome(result: Result<(), SchemaValidationError>, label: &str) -> Result<u8> {
    match result {
        Ok(()) => Ok(0),
        Err(SchemaValidationError::ValidationFailed { violations, .. }) => {
            println!("Schema validation: FAIL ({label})");
            for v in violations.violations() {
                println!("ERROR: {}", v.to_string().trim_start());
            }
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

fn validate_manifest(
    args: &ManifestArgs,
    registry: &SchemaValidator,
    config: &ContractsConfig,
) -> Result<u8> {
    let manifest_path = resolve_path(&args.path, &config.root);
    let manifest = load_document(&manifest_path)?;

    let requested = schema_path(args.schema.as_deref(), config.manifest_schema.clone(), config);
    let schema_path = resolve_versioned_schema(&manifest, &requested);
    if schema_path != requested {
        tracing::info!(
            schema = %schema_path.display(),
            "manifest declares schema_version, using snapshot"
        );
    }
    let schema = load_document(&schema_path)?;
    let label = file_name(&schema_path);

    let code = report_outcome(registry.validate_against(&manifest, &schema, &label), &label)?;
    if code != 0 {
        return Ok(code);
    }
    println!("Schema validation: PASS");

    if let Some(policy) = &args.policy {
        let policy_path = resolve_path(policy, &config.root);
        if policy_path.exists() {
            let policy = load_document(&policy_path)?;
            let warnings = compare_to_policy(&manifest, &policy);
            if warnings.is_empty() {
                println!("Policy comparison: OK (no differences)");
            }
            for w in &warnings {
                println!("WARNING: {w}");
            }
            tracing::info!(warnings = warnings.len(), "compared manifest to policy");
        } else {
            tracing::warn!(policy = %policy_path.display(), "policy file not found, comparison skipped");
        }
    }
    Ok(0)
}

fn validate_jsonl(
    args: &DocumentArgs,
    registry: &SchemaValidator,
    config: &ContractsConfig,
) -> Result<u8> {
    let path = resolve_path(&args.path, &config.root);
    let schema_path = schema_path(
        args.schema.as_deref(),
        config.schema_dir.join(BARS_DOWNLOAD_SCHEMA),
        config,
    );
    let schema = load_document(&schema_path)?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    match registry.validate_jsonl(&text, &schema, &file_name(&schema_path)) {
        Ok(records) => {
            println!("Schema validation: PASS (records={records})");
            Ok(0)
        }
        Err(SchemaValidationError::InvalidLine { line, reason }) => {
            println!("ERROR: line {line} {reason}");
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

fn validate_coverage(
    args: &DocumentArgs,
    registry: &SchemaValidator,
    config: &ContractsConfig,
) -> Result<u8> {
    let path = resolve_path(&args.path, &config.root);
    let schema_path = schema_path(
        args.schema.as_deref(),
        config.schema_dir.join(BARS_COVERAGE_SCHEMA),
        config,
    );
    let document = load_document(&path)?;
    let schema = load_document(&schema_path)?;
    let label = file_name(&schema_path);

    let code = report_outcome(registry.validate_against(&document, &schema, &label), &label)?;
    if code == 0 {
        println!("Schema validation: PASS");
    }
    Ok(code)
}
