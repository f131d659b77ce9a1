//! # Schema Audit Subcommand
//!
//! Inventories every schema in the schema directory, rejects schemas whose
//! `required` lists repeat a name, and compares each structural hash with
//! its checksum baseline.
//!
//! Writes `schema_audit.json` to the output directory. Exits `2` when any
//! schema has drifted.

use anyhow::{Context, Result};
use serde::Serialize;

use mlc_schema::catalog::file_name;
use mlc_schema::{
    audit_schema, ensure_unique_required, load_document, schema_files, verify_drift,
    BaselineEntry, ChecksumStore, SchemaAudit,
};

use crate::config::ContractsConfig;
use crate::report::write_report;

/// Report file name under the output directory.
pub const SCHEMA_AUDIT_REPORT: &str = "schema_audit.json";

/// One row of the schema audit report.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaAuditRow {
    #[serde(flatten)]
    pub audit: SchemaAudit,
    /// Accepted baseline hash, if one was recorded and readable.
    pub stored_hash: Option<String>,
    /// True when the schema no longer matches its baseline.
    pub drift: bool,
    /// Why the baseline could not be read, when it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_error: Option<String>,
}

/// The `schema_audit.json` document.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaAuditReport {
    pub schemas: Vec<SchemaAuditRow>,
    pub drift_count: usize,
}

/// Audit every schema under the configured schema directory.
pub fn audit_schemas(config: &ContractsConfig) -> Result<SchemaAuditReport> {
    let baseline = ChecksumStore::new(&config.checksum_dir)
        .load()
        .context("cannot load checksum baseline")?;
    let files = schema_files(&config.schema_dir)
        .with_context(|| format!("cannot list schemas in {}", config.schema_dir.display()))?;

    let mut rows = Vec::with_capacity(files.len());
    for path in &files {
        let name = file_name(path);
        let schema = load_document(path)?;
        ensure_unique_required(&schema).with_context(|| format!("schema {name} failed lint"))?;

        let audit = audit_schema(&name, &schema);
        let row = match baseline.entry(&name) {
            BaselineEntry::Missing => {
                tracing::debug!(schema = %name, "no baseline recorded");
                SchemaAuditRow {
                    audit,
                    stored_hash: None,
                    drift: false,
                    baseline_error: None,
                }
            }
            BaselineEntry::Recorded(stored) => {
                let status = verify_drift(&schema, Some(stored));
                if status.drifted {
                    tracing::warn!(
                        schema = %name,
                        current = %status.current,
                        baseline = %stored,
                        "schema drifted from baseline"
                    );
                }
                SchemaAuditRow {
                    audit,
                    stored_hash: Some(stored.to_hex()),
                    drift: status.drifted,
                    baseline_error: None,
                }
            }
            BaselineEntry::Unreadable(reason) => {
                tracing::warn!(schema = %name, reason, "unreadable baseline treated as drift");
                SchemaAuditRow {
                    audit,
                    stored_hash: None,
                    drift: true,
                    baseline_error: Some(reason.to_string()),
                }
            }
        };
        rows.push(row);
    }

    let drift_count = rows.iter().filter(|r| r.drift).count();
    tracing::info!(schemas = rows.len(), drift_count, "schema audit complete");
    Ok(SchemaAuditReport {
        schemas: rows,
        drift_count,
    })
}

/// Run `mlc schemas`.
pub fn run_schemas(config: &ContractsConfig) -> Result<u8> {
    let report = audit_schemas(config)?;
    let out = config.out_dir.join(SCHEMA_AUDIT_REPORT);
    write_report(&out, &report)?;

    if report.drift_count > 0 {
        for row in report.schemas.iter().filter(|r| r.drift) {
            eprintln!("DRIFT: {}", row.audit.file);
        }
        eprintln!("Schema drift detected: {}", report.drift_count);
        return Ok(2);
    }
    println!("Schema audit: OK ({} schemas) -> {}", report.schemas.len(), out.display());
    Ok(0)
}
