//! # Required-List Lint
//!
//! JSON objects cannot carry duplicate keys once parsed, but a `required`
//! array can still repeat a name. Such a schema is rejected before it is
//! audited or baselined.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;

/// A repeated name inside a `required` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRequired {
    /// Pointer to the object owning the array, e.g. `#/properties/inner`.
    pub pointer: String,
    /// The repeated property name.
    pub name: String,
}

/// Find every duplicated `required` entry anywhere in `schema`.
///
/// Findings are returned in document order, one per repeated name per
/// array.
pub fn duplicate_required_entries(schema: &Value) -> Vec<DuplicateRequired> {
    collect(schema, "#".to_string())
}

fn collect(node: &Value, pointer: String) -> Vec<DuplicateRequired> {
    match node {
        Value::Object(map) => {
            let mut found = Vec::new();
            if let Some(Value::Array(required)) = map.get("required") {
                let mut seen = BTreeSet::new();
                let mut reported = BTreeSet::new();
                for name in required.iter().filter_map(Value::as_str) {
                    if !seen.insert(name) && reported.insert(name) {
                        found.push(DuplicateRequired {
                            pointer: pointer.clone(),
                            name: name.to_string(),
                        });
                    }
                }
            }
            for (key, child) in map {
                found.extend(collect(child, format!("{pointer}/{key}")));
            }
            found
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .flat_map(|(i, child)| collect(child, format!("{pointer}/{i}")))
            .collect(),
        _ => Vec::new(),
    }
}

/// Fail on the first duplicated `required` entry in `schema`.
pub fn ensure_unique_required(schema: &Value) -> Result<(), SchemaError> {
    match duplicate_required_entries(schema).into_iter().next() {
        Some(DuplicateRequired { pointer, name }) => {
            Err(SchemaError::DuplicateRequiredEntry { pointer, name })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_schema_has_no_findings() {
        let schema = json!({
            "required": ["a", "b"],
            "properties": {"a": {"required": ["x"]}}
        });
        assert!(duplicate_required_entries(&schema).is_empty());
        assert!(ensure_unique_required(&schema).is_ok());
    }

    #[test]
    fn root_duplicate_found() {
        let schema = json!({"required": ["a", "b", "a", "a"]});
        let findings = duplicate_required_entries(&schema);
        assert_eq!(
            findings,
            vec![DuplicateRequired { pointer: "#".into(), name: "a".into() }]
        );
    }

    #[test]
    fn nested_duplicate_reports_pointer() {
        let schema = json!({
            "properties": {"inner": {"type": "object", "required": ["k", "k"]}}
        });
        let findings = duplicate_required_entries(&schema);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].pointer, "#/properties/inner");
    }

    #[test]
    fn duplicates_inside_arrays_use_index() {
        let schema = json!({"anyOf": [{}, {"required": ["z", "z"]}]});
        let findings = duplicate_required_entries(&schema);
        assert_eq!(findings[0].pointer, "#/anyOf/1");
    }

    #[test]
    fn ensure_unique_reports_first_finding() {
        let schema = json!({"required": ["m", "m"]});
        match ensure_unique_required(&schema) {
            Err(SchemaError::DuplicateRequiredEntry { pointer, name }) => {
                assert_eq!(pointer, "#");
                assert_eq!(name, "m");
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn property_named_required_is_not_an_array() {
        let schema = json!({"properties": {"required": {"type": "boolean"}}});
        assert!(duplicate_required_entries(&schema).is_empty());
    }
}
