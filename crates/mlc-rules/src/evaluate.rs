//! # Rule Evaluation
//!
//! Evaluates promotion rules written in a small, closed subset of JSON
//! Logic:
//!
//! ```json
//! {"and": [
//!   {">=": [{"var": "metrics.sharpe_sim.value"}, 1.0]},
//!   {"<":  [{"var": "latency_metrics.p95_ms.value"}, 25.0]}
//! ]}
//! ```
//!
//! Supported operators are `and`, `>=`, `>`, `<=` and `<`. When one object
//! carries several of them, `and` wins, then the comparisons in that order.
//! Any other operator is rejected rather than ignored.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::RuleError;
use crate::resolve::resolve_operand;

/// Conjunction operator key.
pub const AND: &str = "and";

/// A binary numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `<`
    Lt,
}

impl Comparison {
    /// Every comparison, in precedence order.
    pub const ALL: [Comparison; 4] = [Self::Ge, Self::Gt, Self::Le, Self::Lt];

    /// The operator key as written in a rule.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Lt => "<",
        }
    }

    /// Apply the comparison.
    pub fn apply(&self, left: f64, right: f64) -> bool {
        match self {
            Self::Ge => left >= right,
            Self::Gt => left > right,
            Self::Le => left <= right,
            Self::Lt => left < right,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Evaluate `rule` against a metrics document.
///
/// # Errors
///
/// - [`RuleError::InvalidRule`] for a rule that is not a non-empty object,
///   an `and` whose value is not a list, or a comparison without exactly
///   two operands.
/// - [`RuleError::VariableNotFound`] / [`RuleError::TypeMismatch`] from
///   operand resolution.
/// - [`RuleError::UnsupportedRule`] for an object with no known operator.
pub fn evaluate(rule: &Value, metrics: &Value) -> Result<bool, RuleError> {
    let map = match rule {
        Value::Object(map) if !map.is_empty() => map,
        _ => {
            return Err(RuleError::InvalidRule(
                "rule must be a non-empty object".to_string(),
            ))
        }
    };

    if let Some(children) = map.get(AND) {
        let children = children.as_array().ok_or_else(|| {
            RuleError::InvalidRule(format!("operator {AND} expects a list, got {children}"))
        })?;
        for child in children {
            if !evaluate(child, metrics)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    for op in Comparison::ALL {
        if let Some(args) = map.get(op.symbol()) {
            return compare(op, args, metrics);
        }
    }

    Err(unsupported(map))
}

fn compare(op: Comparison, args: &Value, metrics: &Value) -> Result<bool, RuleError> {
    let [left, right] = args.as_array().map(Vec::as_slice).unwrap_or_default() else {
        return Err(RuleError::InvalidRule(format!(
            "operator {op} expects a 2-element list"
        )));
    };
    let left = number(op, resolve_operand(left, metrics)?)?;
    let right = number(op, resolve_operand(right, metrics)?)?;
    Ok(op.apply(left, right))
}

/// Booleans are not numbers here, unlike in some JSON Logic engines.
fn number(op: Comparison, value: &Value) -> Result<f64, RuleError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| RuleError::TypeMismatch {
            operator: op.to_string(),
            detail: format!("number {n} is not representable as f64"),
        }),
        other => Err(RuleError::TypeMismatch {
            operator: op.to_string(),
            detail: format!("comparison operands must be numbers, got {other}"),
        }),
    }
}

fn unsupported(map: &Map<String, Value>) -> RuleError {
    RuleError::UnsupportedRule {
        fragment: Value::Object(map.clone()).to_string(),
    }
}
