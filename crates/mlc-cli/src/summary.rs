//! # Full Contracts Sweep
//!
//! `mlc all` runs the schema audit, the fixture audit and the promotion
//! rule audit, writes each report plus `summary.json`, and prints one
//! machine-readable line:
//!
//! ```text
//! SUMMARY {"schemas":4,"fixtures":2,"drift":0,"rule_errors":0,"invalid_examples":1,"duration_sec":0.012}
//! ```
//!
//! `rule_errors` is `1` when the promotion rule fails its audit and `0`
//! otherwise. Exits `2` when any schema drifted or the rule references
//! undeclared metrics.

use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use mlc_rules::audit_rule;
use mlc_schema::load_document;

use crate::config::ContractsConfig;
use crate::fixtures::{audit_fixtures, FIXTURE_AUDIT_REPORT};
use crate::report::write_report;
use crate::schemas::{audit_schemas, SCHEMA_AUDIT_REPORT};

/// Rule audit report file name.
pub const RULE_AUDIT_REPORT: &str = "promotion_rule_audit.json";
/// Summary report file name.
pub const SUMMARY_REPORT: &str = "summary.json";

/// Counts from one sweep. Field order is the order of the `SUMMARY` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractsSummary {
    pub schemas: usize,
    pub fixtures: usize,
    pub drift: usize,
    pub rule_errors: usize,
    pub invalid_examples: usize,
    pub duration_sec: f64,
}

impl ContractsSummary {
    /// True when nothing blocks a release.
    pub fn is_clean(&self) -> bool {
        self.drift == 0 && self.rule_errors == 0
    }
}

fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// Run every audit, writing reports under the output directory.
pub fn run_sweep(config: &ContractsConfig) -> Result<ContractsSummary> {
    let started = Instant::now();

    let schemas = audit_schemas(config)?;
    write_report(&config.out_dir.join(SCHEMA_AUDIT_REPORT), &schemas)?;

    let fixtures = audit_fixtures(config)?;
    write_report(&config.out_dir.join(FIXTURE_AUDIT_REPORT), &fixtures)?;

    let rule = load_document(&config.rule_path).context("cannot load promotion rule")?;
    let schema = load_document(&config.manifest_schema).context("cannot load manifest schema")?;
    let rule_audit = audit_rule(&rule, &schema);
    write_report(&config.out_dir.join(RULE_AUDIT_REPORT), &rule_audit)?;

    let summary = ContractsSummary {
        schemas: schemas.schemas.len(),
        fixtures: fixtures.fixtures.len(),
        drift: schemas.drift_count,
        rule_errors: usize::from(!rule_audit.valid),
        invalid_examples: fixtures.invalid_examples,
        duration_sec: round_millis(started.elapsed().as_secs_f64()),
    };
    write_report(&config.out_dir.join(SUMMARY_REPORT), &summary)?;
    tracing::info!(
        schemas = summary.schemas,
        drift = summary.drift,
        rule_errors = summary.rule_errors,
        "contracts sweep complete"
    );
    Ok(summary)
}

/// Run `mlc all`.
pub fn run_all(config: &ContractsConfig) -> Result<u8> {
    let summary = run_sweep(config)?;
    println!("SUMMARY {}", serde_json::to_string(&summary)?);
    Ok(if summary.is_clean() { 0 } else { 2 })
}
