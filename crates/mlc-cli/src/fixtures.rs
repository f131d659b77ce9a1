//! # Fixture Audit Subcommand
//!
//! Validates every `model_manifest_*.json` fixture against the manifest
//! schema. A fixture whose name contains `_invalid` is expected to fail;
//! every other fixture is expected to pass. Writes `fixtures_audit.json`
//! and exits `1` when any fixture does not behave as its name says.

use anyhow::{Context, Result};
use serde::Serialize;

use mlc_schema::catalog::file_name;
use mlc_schema::load_document;

use crate::config::ContractsConfig;
use crate::report::write_report;
use crate::validate::load_registry;

/// Report file name under the output directory.
pub const FIXTURE_AUDIT_REPORT: &str = "fixtures_audit.json";

const FIXTURE_PREFIX: &str = "model_manifest_";
const INVALID_MARKER: &str = "_invalid";

/// Outcome for one fixture.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureResult {
    pub fixture: String,
    /// Whether the fixture validated.
    pub valid: bool,
    /// Whether its name says it should.
    pub expected_valid: bool,
    /// Violation messages, empty when valid.
    pub errors: Vec<String>,
}

impl FixtureResult {
    /// True when the fixture behaved as its name says.
    pub fn as_expected(&self) -> bool {
        self.valid == self.expected_valid
    }
}

/// The `fixtures_audit.json` document.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureAuditReport {
    pub fixtures: Vec<FixtureResult>,
    /// Fixtures that failed validation, expected or not.
    pub invalid_examples: usize,
    /// Fixtures that did not behave as their name says.
    pub unexpected: usize,
}

fn is_manifest_fixture(name: &str) -> bool {
    name.starts_with(FIXTURE_PREFIX) && name.ends_with(".json")
}

/// Validate every manifest fixture against the manifest schema.
pub fn audit_fixtures(config: &ContractsConfig) -> Result<FixtureAuditReport> {
    let schema = load_document(&config.manifest_schema)?;
    let label = file_name(&config.manifest_schema);
    let validator = load_registry(&config.schema_dir)?;

    let mut paths = Vec::new();
    if config.fixtures_dir.is_dir() {
        for entry in std::fs::read_dir(&config.fixtures_dir)
            .with_context(|| format!("cannot read {}", config.fixtures_dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && is_manifest_fixture(&file_name(&path)) {
                paths.push(path);
            }
        }
    } else {
        tracing::warn!(dir = %config.fixtures_dir.display(), "fixtures directory not found");
    }
    paths.sort();

    let mut fixtures = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = file_name(path);
        let document = load_document(path)?;
        let errors: Vec<String> = validator
            .violations(&document, &schema, &label)?
            .into_iter()
            .map(|v| v.message)
            .collect();
        let result = FixtureResult {
            expected_valid: !name.contains(INVALID_MARKER),
            valid: errors.is_empty(),
            errors,
            fixture: name,
        };
        if !result.as_expected() {
            tracing::warn!(
                fixture = %result.fixture,
                valid = result.valid,
                expected_valid = result.expected_valid,
                "fixture did not behave as expected"
            );
        }
        fixtures.push(result);
    }

    let invalid_examples = fixtures.iter().filter(|f| !f.valid).count();
    let unexpected = fixtures.iter().filter(|f| !f.as_expected()).count();
    tracing::info!(fixtures = fixtures.len(), invalid_examples, unexpected, "fixture audit complete");
    Ok(FixtureAuditReport {
        fixtures,
        invalid_examples,
        unexpected,
    })
}

/// Run `mlc fixtures`.
pub fn run_fixtures(config: &ContractsConfig) -> Result<u8> {
    let report = audit_fixtures(config)?;
    write_report(&config.out_dir.join(FIXTURE_AUDIT_REPORT), &report)?;

    for f in &report.fixtures {
        let status = if f.as_expected() { "OK" } else { "UNEXPECTED" };
        println!(
            "{status}: {} (valid={}, expected_valid={})",
            f.fixture, f.valid, f.expected_valid
        );
    }
    Ok(if report.unexpected > 0 { 1 } else { 0 })
}
