//! # Schema Inventory
//!
//! Per-schema summary rows for the schema audit report.

use mlc_core::ContentDigest;
use serde::Serialize;
use serde_json::Value;

use crate::hash::structural_hash;

/// Inventory row for one schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaAudit {
    /// File name of the schema, without directory.
    pub file: String,
    /// Declared `schema_version` constant, if any.
    pub schema_version: Option<String>,
    /// Number of root `required` entries.
    pub required_count: usize,
    /// Number of root properties.
    pub properties_count: usize,
    /// Structural hash of the schema.
    pub structural_hash: ContentDigest,
}

/// Summarize `schema`, reported under `file`.
pub fn audit_schema(file: &str, schema: &Value) -> SchemaAudit {
    SchemaAudit {
        file: file.to_string(),
        schema_version: extract_schema_version(schema),
        required_count: schema
            .get("required")
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
        properties_count: schema
            .get("properties")
            .and_then(Value::as_object)
            .map_or(0, |p| p.len()),
        structural_hash: structural_hash(schema),
    }
}

/// Read the `schema_version` constant a schema pins its instances to.
///
/// Looks at `properties.schema_version.const` first, then a root-level
/// `schema_version.const`. Strings are returned verbatim; other values are
/// rendered as JSON text.
pub fn extract_schema_version(schema: &Value) -> Option<String> {
    let from_properties = schema
        .get("properties")
        .and_then(|p| p.get("schema_version"))
        .and_then(|sv| sv.get("const"));
    let from_root = || schema.get("schema_version").and_then(|sv| sv.get("const"));

    from_properties.or_else(from_root).map(|c| match c {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn audit_counts_root_fields() {
        let schema = json!({
            "required": ["a", "b"],
            "properties": {"a": {}, "b": {}, "c": {}, "schema_version": {"const": "v3"}}
        });
        let row = audit_schema("x.schema.json", &schema);
        assert_eq!(row.file, "x.schema.json");
        assert_eq!(row.required_count, 2);
        assert_eq!(row.properties_count, 4);
        assert_eq!(row.schema_version.as_deref(), Some("v3"));
        assert_eq!(row.structural_hash, structural_hash(&schema));
    }

    #[test]
    fn audit_tolerates_missing_fields() {
        let row = audit_schema("empty.schema.json", &json!({}));
        assert_eq!(row.required_count, 0);
        assert_eq!(row.properties_count, 0);
        assert_eq!(row.schema_version, None);
    }

    #[test]
    fn version_from_root_const() {
        let schema = json!({"schema_version": {"const": 2}});
        assert_eq!(extract_schema_version(&schema).as_deref(), Some("2"));
    }

    #[test]
    fn properties_version_wins_over_root() {
        let schema = json!({
            "schema_version": {"const": "root"},
            "properties": {"schema_version": {"const": "prop"}}
        });
        assert_eq!(extract_schema_version(&schema).as_deref(), Some("prop"));
    }

    #[test]
    fn version_without_const_is_none() {
        let schema = json!({"properties": {"schema_version": {"type": "string"}}});
        assert_eq!(extract_schema_version(&schema), None);
    }

    #[test]
    fn serializes_hash_as_hex() {
        let row = audit_schema("a.schema.json", &json!({}));
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["structural_hash"].as_str().map(str::len), Some(64));
        assert!(v["schema_version"].is_null());
    }
}
