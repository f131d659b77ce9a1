//! # Promote Subcommand
//!
//! Audits the promotion rule against the manifest schema, then evaluates it
//! against a candidate manifest.
//!
//! | Outcome                            | Output                         | Exit |
//! |------------------------------------|--------------------------------|------|
//! | Rule passes                        | `PASS`                         | 0    |
//! | Rule fails                         | `FAIL`                         | 1    |
//! | Rule references undeclared metrics | `{"error":"missing metrics",…}`| 2    |
//! | Rule cannot be evaluated           | `{"error": "<reason>"}`        | 3    |

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use mlc_rules::{audit_rule, check_promotion, PromotionOutcome, RuleAudit};
use mlc_schema::load_document;

use crate::config::ContractsConfig;
use crate::report::render_pretty;
use crate::resolve_path;

/// Arguments for `mlc promote`.
#[derive(Args, Debug, Default)]
pub struct PromoteArgs {
    /// Candidate manifest holding the metrics.
    #[arg(required_unless_present = "audit_only")]
    pub manifest: Option<PathBuf>,

    /// Promotion rule. Defaults to the configured rule.
    #[arg(long)]
    pub rule: Option<PathBuf>,

    /// Manifest schema to audit the rule against.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Only audit the rule; print the audit and exit.
    #[arg(long)]
    pub audit_only: bool,
}

#[derive(Serialize)]
struct MissingMetrics<'a> {
    error: &'static str,
    #[serde(flatten)]
    audit: &'a RuleAudit,
}

#[derive(Serialize)]
struct EvaluationError {
    error: String,
}

/// Run `mlc promote`.
pub fn run_promote(args: &PromoteArgs, config: &ContractsConfig) -> Result<u8> {
    let rule_path = args
        .rule
        .as_deref()
        .map(|p| resolve_path(p, &config.root))
        .unwrap_or_else(|| config.rule_path.clone());
    let schema_path = args
        .schema
        .as_deref()
        .map(|p| resolve_path(p, &config.root))
        .unwrap_or_else(|| config.manifest_schema.clone());

    let rule = load_document(&rule_path).context("cannot load promotion rule")?;
    let schema = load_document(&schema_path).context("cannot load manifest schema")?;

    if args.audit_only {
        let audit = audit_rule(&rule, &schema);
        println!("{}", render_pretty(&audit)?);
        return Ok(if audit.valid { 0 } else { 2 });
    }

    let Some(manifest) = &args.manifest else {
        anyhow::bail!("a manifest is required unless --audit-only is given");
    };
    let manifest_path = resolve_path(manifest, &config.root);
    let metrics = load_document(&manifest_path)?;

    match check_promotion(&rule, &schema, &metrics) {
        Ok(PromotionOutcome::Passed) => {
            tracing::info!(manifest = %manifest_path.display(), "promotion rule passed");
            println!("PASS");
            Ok(0)
        }
        Ok(PromotionOutcome::Failed) => {
            tracing::info!(manifest = %manifest_path.display(), "promotion rule failed");
            println!("FAIL");
            Ok(1)
        }
        Ok(PromotionOutcome::Rejected(audit)) => {
            tracing::warn!(missing = ?audit.missing_metrics, "rule references undeclared metrics");
            let body = MissingMetrics {
                error: "missing metrics",
                audit: &audit,
            };
            println!("{}", render_pretty(&body)?);
            Ok(2)
        }
        Err(e) => {
            tracing::error!(error = %e, "promotion rule could not be evaluated");
            println!("{}", render_pretty(&EvaluationError { error: e.to_string() })?);
            Ok(3)
        }
    }
}
