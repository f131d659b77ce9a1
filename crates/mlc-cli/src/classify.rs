//! `mlc classify OLD NEW` prints the change class between two schema
//! revisions. Breaking changes exit `1`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use mlc_schema::{classify_change, load_document};

use crate::config::ContractsConfig;
use crate::resolve_path;

/// Arguments for `mlc classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// The earlier schema revision.
    pub old: PathBuf,
    /// The later schema revision.
    pub new: PathBuf,
}

/// Run `mlc classify`.
pub fn run_classify(args: &ClassifyArgs, config: &ContractsConfig) -> Result<u8> {
    let old_path = resolve_path(&args.old, &config.root);
    let new_path = resolve_path(&args.new, &config.root);
    let old = load_document(&old_path)?;
    let new = load_document(&new_path)?;

    let class = classify_change(&old, &new);
    tracing::info!(
        old = %old_path.display(),
        new = %new_path.display(),
        class = %class,
        "classified schema change"
    );
    println!("{class}");
    Ok(if class.is_breaking() { 1 } else { 0 })
}
