//! # Schema Catalog
//!
//! Locating schema files in a directory and loading JSON or YAML documents
//! into the JSON data model.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::SchemaError;

/// True for mutable current schemas, `*.schema.json`.
fn is_current_schema(name: &str) -> bool {
    name.ends_with(".schema.json")
}

/// True for immutable snapshots, `*.schema.v*.json`.
pub fn is_snapshot_schema(name: &str) -> bool {
    name.ends_with(".json")
        && name
            .find(".schema.v")
            .is_some_and(|i| i + ".schema.v".len() <= name.len() - ".json".len())
}

fn list_matching(dir: &Path, matches: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, SchemaError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::DocumentLoad {
        path: dir.to_path_buf(),
        reason: format!("cannot read schema directory: {e}"),
    })?;

    let mut found = BTreeSet::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()).is_some_and(&matches) {
            found.insert(path);
        }
    }
    Ok(found.into_iter().collect())
}

/// All schema files in `dir`: current schemas and versioned snapshots,
/// sorted by path.
pub fn schema_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    list_matching(dir, |name| is_current_schema(name) || is_snapshot_schema(name))
}

/// Only the versioned snapshot schemas in `dir`, sorted by path.
pub fn snapshot_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    list_matching(dir, is_snapshot_schema)
}

/// File name of `path` as UTF-8, or the full path when it has none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load a document from disk.
///
/// `.yaml` and `.yml` files are parsed as YAML and converted to the JSON
/// data model; everything else is parsed as JSON.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let load_err = |reason: String| SchemaError::DocumentLoad {
        path: path.to_path_buf(),
        reason,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| load_err(format!("cannot read file: {e}")))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| load_err(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml)
                .map_err(|e| load_err(format!("YAML-to-JSON conversion failed: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_err(format!("invalid JSON: {e}"))),
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped and scalar map keys are rendered as strings. Floats
/// that JSON cannot represent (NaN, infinities) are rejected.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
