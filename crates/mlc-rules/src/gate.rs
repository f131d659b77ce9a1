//! # Promotion Gate
//!
//! Audit first, then evaluate. A rule that references metrics the schema
//! does not declare is rejected without being evaluated.

use serde_json::Value;

use crate::audit::{audit_rule, RuleAudit};
use crate::error::RuleError;
use crate::evaluate::evaluate;

/// Decision for one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// The rule evaluated to true.
    Passed,
    /// The rule evaluated to false.
    Failed,
    /// The rule failed its audit and was not evaluated.
    Rejected(RuleAudit),
}

/// Gate a manifest (`metrics`) through `rule`, audited against `schema`.
pub fn check_promotion(
    rule: &Value,
    schema: &Value,
    metrics: &Value,
) -> Result<PromotionOutcome, RuleError> {
    let audit = audit_rule(rule, schema);
    if !audit.valid {
        return Ok(PromotionOutcome::Rejected(audit));
    }
    Ok(if evaluate(rule, metrics)? {
        PromotionOutcome::Passed
    } else {
        PromotionOutcome::Failed
    })
}
