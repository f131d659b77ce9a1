//! # Checksum Subcommands
//!
//! `mlc checksums` accepts the current state of every snapshot schema as
//! the new baseline and republishes the manifest hash artifact.
//! `mlc manifest-hash` prints the manifest schema's document hash and can
//! publish it on its own.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use mlc_core::ContentDigest;
use mlc_schema::catalog::file_name;
use mlc_schema::{document_hash, load_document, snapshot_files, structural_hash, ChecksumStore};

use crate::config::ContractsConfig;
use crate::report::write_report;
use crate::resolve_path;

/// Arguments for `mlc manifest-hash`.
#[derive(Args, Debug, Default)]
pub struct ManifestHashArgs {
    /// Schema to hash. Defaults to the configured manifest schema.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Also write the hash artifact.
    #[arg(long)]
    pub write_artifact: bool,

    /// Where to write the artifact. Defaults to the configured artifact path.
    #[arg(long)]
    pub artifact_path: Option<PathBuf>,
}

/// Contents of the manifest hash artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestHashArtifact {
    pub schema: String,
    pub sha256: ContentDigest,
}

/// Hash `schema_path` and write the artifact to `artifact_path`.
pub fn publish_manifest_hash(schema_path: &Path, artifact_path: &Path) -> Result<ContentDigest> {
    let schema = load_document(schema_path)?;
    let digest = document_hash(&schema);
    let artifact = ManifestHashArtifact {
        schema: schema_path.display().to_string(),
        sha256: digest,
    };
    write_report(artifact_path, &artifact)?;
    tracing::info!(
        schema = %schema_path.display(),
        artifact = %artifact_path.display(),
        sha256 = %digest,
        "published manifest hash"
    );
    Ok(digest)
}

/// Run `mlc checksums`.
pub fn run_checksums(config: &ContractsConfig) -> Result<u8> {
    let snapshots = snapshot_files(&config.schema_dir)
        .with_context(|| format!("cannot list schemas in {}", config.schema_dir.display()))?;
    if snapshots.is_empty() {
        eprintln!("No snapshot schemas found in {}", config.schema_dir.display());
        return Ok(1);
    }

    let store = ChecksumStore::new(&config.checksum_dir);
    for path in &snapshots {
        let name = file_name(path);
        let schema = load_document(path)?;
        let digest = structural_hash(&schema);
        let record = store
            .write(&name, &digest)
            .with_context(|| format!("cannot write baseline for {name}"))?;
        tracing::debug!(schema = %name, record = %record.display(), "baseline written");
        println!("WROTE {name}: {digest}");
    }

    let digest = publish_manifest_hash(&config.manifest_schema, &config.artifact_path)?;
    println!(
        "WROTE manifest hash artifact: {digest} -> {}",
        config.artifact_path.display()
    );
    Ok(0)
}

/// Run `mlc manifest-hash`.
pub fn run_manifest_hash(args: &ManifestHashArgs, config: &ContractsConfig) -> Result<u8> {
    let schema_path = args
        .schema
        .as_deref()
        .map(|p| resolve_path(p, &config.root))
        .unwrap_or_else(|| config.manifest_schema.clone());

    if args.write_artifact {
        let artifact_path = args
            .artifact_path
            .clone()
            .unwrap_or_else(|| config.artifact_path.clone());
        let digest = publish_manifest_hash(&schema_path, &artifact_path)?;
        println!("{digest}");
    } else {
        let schema = load_document(&schema_path)?;
        println!("{}", document_hash(&schema));
    }
    Ok(0)
}
