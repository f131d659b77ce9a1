//! # Error Types
//!
//! Failures raised while resolving variables or evaluating a rule. Audit
//! findings are not errors; they are reported in
//! [`RuleAudit`](crate::audit::RuleAudit).

use thiserror::Error;

/// Error from rule resolution or evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A `var` path does not exist in the metrics document.
    #[error("variable path not found: {path}")]
    VariableNotFound {
        /// The full dotted path as written in the rule.
        path: String,
    },

    /// The rule is structurally malformed.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// A comparison operand did not resolve to a number.
    #[error("operator {operator}: {detail}")]
    TypeMismatch {
        /// The comparison operator.
        operator: String,
        /// What was found instead of a number.
        detail: String,
    },

    /// The rule uses an operator outside the supported set.
    #[error("unsupported rule segment: {fragment}")]
    UnsupportedRule {
        /// The offending rule fragment as compact JSON.
        fragment: String,
    },
}
