//! # Rule Audit
//!
//! Checks that every metric a rule references is declared by the manifest
//! schema. A rule that mentions a metric the schema does not define would
//! fail at evaluation time on every manifest, so the audit runs before the
//! rule is trusted.
//!
//! A reference `section.metric[.field...]` is checked against the keys of
//! `schema.properties[section].properties`. A section the schema does not
//! describe with a `properties` block is recorded with an empty list and
//! not checked further.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::resolve::VAR_KEY;

/// Result of auditing a rule against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleAudit {
    /// Every `var` path in the rule, sorted.
    pub referenced_vars: Vec<String>,
    /// Properties the schema declares for each referenced section, sorted.
    pub section_properties: BTreeMap<String, Vec<String>>,
    /// References absent from their section, as `section.metric`.
    pub missing_metrics: Vec<String>,
    /// True when nothing is missing.
    pub valid: bool,
}

/// Collect every string found under a `var` key anywhere in `rule`.
pub fn referenced_variables(rule: &Value) -> BTreeSet<String> {
    match rule {
        Value::Object(map) => {
            let own = map
                .get(VAR_KEY)
                .and_then(Value::as_str)
                .map(str::to_string);
            map.values()
                .flat_map(referenced_variables)
                .chain(own)
                .collect()
        }
        Value::Array(items) => items.iter().flat_map(referenced_variables).collect(),
        _ => BTreeSet::new(),
    }
}

/// Property names declared under `schema.properties[section].properties`.
fn section_properties(schema: &Value, section: &str) -> BTreeSet<String> {
    schema
        .get("properties")
        .and_then(|p| p.get(section))
        .and_then(|s| s.get("properties"))
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

/// Audit `rule` against the manifest `schema`.
pub fn audit_rule(rule: &Value, schema: &Value) -> RuleAudit {
    let refs = referenced_variables(rule);

    let mut sections: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for path in &refs {
        let mut parts = path.split('.');
        let section = parts.next().unwrap_or_default();
        let metric = parts.next().unwrap_or_default();
        sections.entry(section).or_default().insert(metric);
    }

    let mut coverage = BTreeMap::new();
    let mut missing = Vec::new();
    for (section, metrics) in sections {
        let available = section_properties(schema, section);
        if !available.is_empty() {
            missing.extend(
                metrics
                    .iter()
                    .filter(|m| !m.is_empty() && !available.contains(**m))
                    .map(|m| format!("{section}.{m}")),
            );
        }
        coverage.insert(section.to_string(), available.into_iter().collect());
    }

    RuleAudit {
        referenced_vars: refs.into_iter().collect(),
        section_properties: coverage,
        valid: missing.is_empty(),
        missing_metrics: missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "properties": {
                "metrics": {"properties": {"sharpe_sim": {}, "hit_rate": {}}},
                "latency_metrics": {"properties": {"p95_ms": {}}},
                "model_id": {"type": "string"}
            }
        })
    }

    #[test]
    fn collects_vars_at_any_depth() {
        let rule = json!({"and": [
            {">=": [{"var": "b.x"}, 1]},
            {"and": [{"<": [{"var": "a.y"}, {"var": "b.x"}]}]}
        ]});
        let vars: Vec<String> = referenced_variables(&rule).into_iter().collect();
        assert_eq!(vars, ["a.y", "b.x"]);
    }

    #[test]
    fn non_string_var_is_ignored() {
        let rule = json!({">": [{"var": 3}, 1]});
        assert!(referenced_variables(&rule).is_empty());
    }

    #[test]
    fn valid_rule_passes_audit() {
        let rule = json!({"and": [
            {">=": [{"var": "metrics.sharpe_sim.value"}, 1.0]},
            {"<": [{"var": "latency_metrics.p95_ms.value"}, 25.0]}
        ]});
        let audit = audit_rule(&rule, &schema());
        assert!(audit.valid);
        assert!(audit.missing_metrics.is_empty());
        assert_eq!(audit.section_properties["metrics"], ["hit_rate", "sharpe_sim"]);
        assert_eq!(audit.section_properties["latency_metrics"], ["p95_ms"]);
    }

    #[test]
    fn missing_metric_is_reported() {
        let rule = json!({">=": [{"var": "metrics.nonexistent_metric.value"}, 1.0]});
        let audit = audit_rule(&rule, &schema());
        assert!(!audit.valid);
        assert_eq!(audit.missing_metrics, ["metrics.nonexistent_metric"]);
        assert_eq!(audit.referenced_vars, ["metrics.nonexistent_metric.value"]);
    }

    #[test]
    fn missing_metrics_sorted_by_section_then_name() {
        let rule = json!({"and": [
            {">": [{"var": "metrics.zeta.value"}, 0]},
            {">": [{"var": "metrics.alpha.value"}, 0]},
            {">": [{"var": "latency_metrics.p99_ms.value"}, 0]}
        ]});
        let audit = audit_rule(&rule, &schema());
        assert_eq!(
            audit.missing_metrics,
            ["latency_metrics.p99_ms", "metrics.alpha", "metrics.zeta"]
        );
    }

    #[test]
    fn unknown_section_recorded_empty_and_not_checked() {
        let rule = json!({">": [{"var": "custom.anything.value"}, 0]});
        let audit = audit_rule(&rule, &schema());
        assert!(audit.valid);
        assert_eq!(audit.section_properties["custom"], Vec::<String>::new());
    }

    #[test]
    fn bare_section_reference_is_not_missing() {
        let rule = json!({">": [{"var": "metrics"}, 0]});
        let audit = audit_rule(&rule, &schema());
        assert!(audit.valid);
        assert!(audit.section_properties.contains_key("metrics"));
    }

    #[test]
    fn serializes_with_expected_keys() {
        let audit = audit_rule(&json!({"<": [1, 2]}), &schema());
        let v = serde_json::to_value(&audit).unwrap();
        assert_eq!(
            v,
            json!({
                "referenced_vars": [],
                "section_properties": {},
                "missing_metrics": [],
                "valid": true
            })
        );
    }
}
