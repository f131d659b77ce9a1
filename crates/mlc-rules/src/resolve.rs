//! # Variable Resolution
//!
//! Turns a rule operand into the value it denotes. An operand of the form
//! `{"var": "section.metric.field"}` is looked up in the metrics document
//! one dotted segment at a time; anything else is a literal.

use serde_json::Value;

use crate::error::RuleError;

/// The key marking a variable reference.
pub const VAR_KEY: &str = "var";

/// Resolve `operand` against `metrics`.
///
/// Values are returned as found; no type coercion happens here, so a
/// string leaf resolves successfully and is rejected later by the
/// comparison that uses it.
///
/// # Errors
///
/// - [`RuleError::InvalidRule`] if the `var` value is not a string.
/// - [`RuleError::VariableNotFound`] the first time a segment is missing or
///   its parent is not an object. The error names the full original path.
pub fn resolve_operand<'a>(operand: &'a Value, metrics: &'a Value) -> Result<&'a Value, RuleError> {
    let Some(var) = operand.as_object().and_then(|o| o.get(VAR_KEY)) else {
        return Ok(operand);
    };
    let path = var
        .as_str()
        .ok_or_else(|| RuleError::InvalidRule(format!("var must be a string path, got {var}")))?;

    path.split('.').try_fold(metrics, |node, segment| {
        node.as_object()
            .and_then(|o| o.get(segment))
            .ok_or_else(|| RuleError::VariableNotFound {
                path: path.to_string(),
            })
    })
}
