//! # Instance Validation
//!
//! Runtime validation of manifests and JSON Lines records against JSON
//! Schema definitions, backed by the `jsonschema` crate.
//!
//! ## Security Invariant
//!
//! Schema validation is a trust boundary. Documents that fail validation
//! are rejected with structured error information: the instance path, the
//! schema path, and a readable message for each violation.
//!
//! ## Dialects
//!
//! A schema whose `$schema` names draft-07 is compiled as Draft 7; every
//! other schema is compiled as Draft 2020-12.
//!
//! ## Schema Resolution
//!
//! All schemas in the schema directory are registered under their file
//! name and their own `$id`. Cross-schema `$ref`s resolve from that
//! registry, falling back to a lookup by the last URI segment. Unknown
//! URIs resolve to the permissive schema `{}`; no network request is ever
//! made.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::{Draft, Retrieve, Uri, ValidationOptions, Validator};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::{file_name, load_document, schema_files};

/// Local retriever that resolves `$ref` URIs to schemas loaded in memory.
struct LocalSchemaRetriever {
    /// Map from URI string or file name to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Ok(serde_json::json!({}))
    }
}

/// JSON Schema dialect used to compile a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Draft 7.
    Draft7,
    /// Draft 2020-12.
    Draft202012,
}

impl Dialect {
    /// Pick the dialect declared by a schema's `$schema` field.
    pub fn detect(schema: &Value) -> Self {
        let meta = schema
            .get("$schema")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if meta.contains("draft-07") {
            Self::Draft7
        } else {
            Self::Draft202012
        }
    }

    fn draft(self) -> Draft {
        match self {
            Self::Draft7 => Draft::Draft7,
            Self::Draft202012 => Draft::Draft202012,
        }
    }
}

/// Failure to validate a document.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document has one or more violations.
    #[error("{schema_name}: document does not conform\n{violations}")]
    ValidationFailed {
        schema_name: String,
        violations: ValidationViolations,
    },

    /// A schema was missing or unparseable.
    #[error("cannot load schema {schema_name}: {reason}")]
    SchemaLoadError { schema_name: String, reason: String },

    /// `jsonschema` rejected the schema itself.
    #[error("cannot compile schema {schema_name}: {reason}")]
    ValidatorBuildError { schema_name: String, reason: String },

    /// A JSON Lines record was not JSON or did not conform.
    #[error("line {line}: {reason}")]
    InvalidLine {
        /// 1-based.
        line: usize,
        reason: String,
    },
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON pointer into the instance; empty for the root.
    pub instance_path: String,
    /// JSON pointer to the failing schema keyword.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "  {at}: {}", self.message)
    }
}

/// The non-empty violation list carried by
/// [`SchemaValidationError::ValidationFailed`]; one violation per line
/// when displayed.
#[derive(Debug, Clone)]
pub struct ValidationViolations(Vec<Violation>);

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(Violation::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

/// A registry of schemas with compiled validation on demand.
///
/// Schemas are loaded once at construction; each validation compiles a
/// validator with the whole registry available for `$ref` resolution.
#[derive(Debug, Default)]
pub struct SchemaValidator {
    /// Directory the schemas were loaded from, if any.
    schema_dir: Option<PathBuf>,
    /// Map from schema file name (e.g., "manifest.schema.json") to parsed value.
    schemas: HashMap<String, Value>,
}

impl SchemaValidator {
    /// Load every current and snapshot schema in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` if the directory or any schema file
    /// cannot be read or parsed.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let files = schema_files(&schema_dir).map_err(|e| SchemaValidationError::SchemaLoadError {
            schema_name: schema_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut schemas = HashMap::new();
        for path in files {
            let name = file_name(&path);
            let value = load_document(&path).map_err(|e| {
                SchemaValidationError::SchemaLoadError {
                    schema_name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            schemas.insert(name, value);
        }

        Ok(Self {
            schema_dir: Some(schema_dir),
            schemas,
        })
    }

    /// An empty registry. Only self-contained schemas can be validated.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of registered schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Registered schema file names, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build `ValidationOptions` for `dialect` with every loaded schema
    /// registered under its file name and `$id`.
    fn build_options(&self, dialect: Dialect) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(dialect.draft());

        let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
        for (filename, value) in &self.schemas {
            if let Some(id_str) = value.get("$id").and_then(|v| v.as_str()) {
                schemas_by_uri.insert(id_str.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename.clone(), value.clone());
        }

        opts.with_retriever(LocalSchemaRetriever { schemas_by_uri });
        opts
    }

    /// Compile `schema` in its declared dialect.
    pub fn compile(&self, schema: &Value, label: &str) -> Result<Validator, SchemaValidationError> {
        self.build_options(Dialect::detect(schema))
            .build(schema)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: label.to_string(),
                reason: e.to_string(),
            })
    }

    /// Build a compiled `Validator` for a loaded schema by file name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` if the schema is not loaded and
    /// `ValidatorBuildError` if it cannot be compiled.
    pub fn build_validator(&self, schema_name: &str) -> Result<Validator, SchemaValidationError> {
        let schema_value = self.schemas.get(schema_name).ok_or_else(|| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_name.to_string(),
                reason: match &self.schema_dir {
                    Some(dir) => format!("schema not found in {}", dir.display()),
                    None => "schema not found".to_string(),
                },
            }
        })?;
        self.compile(schema_value, schema_name)
    }

    /// Validate `instance` against a loaded schema.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` with structured violation details if
    /// the document is invalid.
    pub fn validate_document(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let validator = self.build_validator(schema_name)?;
        check(&validator, instance, schema_name)
    }

    /// Validate `instance` against an arbitrary schema value, reported
    /// under `label`. The registry is still used for `$ref` resolution.
    pub fn validate_against(
        &self,
        instance: &Value,
        schema: &Value,
        label: &str,
    ) -> Result<(), SchemaValidationError> {
        let validator = self.compile(schema, label)?;
        check(&validator, instance, label)
    }

    /// Collect violations without turning them into an error.
    pub fn violations(
        &self,
        instance: &Value,
        schema: &Value,
        label: &str,
    ) -> Result<Vec<Violation>, SchemaValidationError> {
        let validator = self.compile(schema, label)?;
        Ok(collect_violations(&validator, instance))
    }

    /// Validate JSON Lines `text` record by record against `schema`.
    ///
    /// Blank lines are skipped. Stops at the first line that is not JSON
    /// or does not validate. Returns the number of records checked.
    pub fn validate_jsonl(
        &self,
        text: &str,
        schema: &Value,
        label: &str,
    ) -> Result<usize, SchemaValidationError> {
        let validator = self.compile(schema, label)?;
        let mut count = 0;
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let record: Value =
                serde_json::from_str(line).map_err(|e| SchemaValidationError::InvalidLine {
                    line: i + 1,
                    reason: format!("not valid JSON: {e}"),
                })?;
            let violations = collect_violations(&validator, &record);
            if let Some(first) = violations.first() {
                return Err(SchemaValidationError::InvalidLine {
                    line: i + 1,
                    reason: format!("failed schema validation: {}", first.message),
                });
            }
            count += 1;
        }
        Ok(count)
    }
}

fn collect_violations(validator: &Validator, instance: &Value) -> Vec<Violation> {
    validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect()
}

fn check(validator: &Validator, instance: &Value, label: &str) -> Result<(), SchemaValidationError> {
    let violations = collect_violations(validator, instance);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaValidationError::ValidationFailed {
            schema_name: label.to_string(),
            violations: ValidationViolations(violations),
        })
    }
}

/// Pick the schema a manifest should be validated against.
///
/// A manifest declaring `schema_version` (e.g. `"v1"`) is checked against
/// the sibling snapshot `<stem>.v1.json` when that file exists, unless
/// `schema_path` already names that version. Otherwise `schema_path` is
/// returned unchanged.
pub fn resolve_versioned_schema(manifest: &Value, schema_path: &Path) -> PathBuf {
    let version = match manifest.get("schema_version") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => return schema_path.to_path_buf(),
        Some(other) => other.to_string(),
    };
    if version.is_empty() {
        return schema_path.to_path_buf();
    }

    let name = file_name(schema_path);
    if name.contains(&format!(".{version}")) {
        return schema_path.to_path_buf();
    }

    let stem = schema_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let candidate_name = match schema_path.extension() {
        Some(ext) => format!("{stem}.{version}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{version}"),
    };
    let candidate = schema_path.with_file_name(candidate_name);
    if candidate.exists() {
        candidate
    } else {
        schema_path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Find the repository root: crates/mlc-schema -> repo root.
    fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop();
        dir.pop();
        dir
    }

    fn schema_dir() -> PathBuf {
        repo_root().join("schemas")
    }

    fn valid_manifest() -> Value {
        json!({
            "schema_version": "v2",
            "model_id": "m-1",
            "dataset_version": "2024-01",
            "data_hash": "a".repeat(64),
            "metrics": {
                "sharpe_sim": {"value": 1.2},
                "hit_rate": {"value": 0.55}
            },
            "latency_metrics": {"p95_ms": {"value": 20.0}}
        })
    }

    #[test]
    fn test_load_repository_schemas() {
        let validator = SchemaValidator::new(schema_dir()).unwrap();
        let names = validator.schema_names();
        assert!(names.contains(&"manifest.schema.json"));
        assert!(names.contains(&"manifest.schema.v1.json"));
        assert!(names.contains(&"bars_download_manifest.schema.json"));
    }

    #[test]
    fn test_all_schemas_compile_to_validators() {
        let validator = SchemaValidator::new(schema_dir()).unwrap();
        let mut failures = Vec::new();
        for name in validator.schema_names() {
            if let Err(e) = validator.build_validator(name) {
                failures.push(format!("{name}: {e}"));
            }
        }
        assert!(failures.is_empty(), "failed to compile:\n{}", failures.join("\n"));
    }

    #[test]
    fn test_dialect_detection() {
        assert_eq!(
            Dialect::detect(&json!({"$schema": "http://json-schema.org/draft-07/schema#"})),
            Dialect::Draft7
        );
        assert_eq!(
            Dialect::detect(&json!({"$schema": "https://json-schema.org/draft/2020-12/schema"})),
            Dialect::Draft202012
        );
        assert_eq!(Dialect::detect(&json!({})), Dialect::Draft202012);
    }

    #[test]
    fn test_validate_valid_manifest() {
        let validator = SchemaValidator::new(schema_dir()).unwrap();
        validator
            .validate_document(&valid_manifest(), "manifest.schema.json")
            .unwrap();
    }

    #[test]
    fn test_validate_missing_field_reports_violation() {
        let validator = SchemaValidator::new(schema_dir()).unwrap();
        let mut doc = valid_manifest();
        doc.as_object_mut().unwrap().remove("dataset_version");
        let err = validator
            .validate_document(&doc, "manifest.schema.json")
            .unwrap_err();
        match &err {
            SchemaValidationError::ValidationFailed { violations, .. } => {
                let messages: Vec<&str> =
                    violations.violations().iter().map(|v| v.message.as_str()).collect();
                assert!(
                    messages.iter().any(|m| m.contains("dataset_version")),
                    "expected violation mentioning dataset_version, got: {messages:?}"
                );
            }
            other => panic!("expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn test_definition_ref_is_enforced() {
        let validator = SchemaValidator::new(schema_dir()).unwrap();
        let mut doc = valid_manifest();
        doc["metrics"]["sharpe_sim"] = json!({"value": "high"});
        let err = validator
            .validate_document(&doc, "manifest.schema.json")
            .unwrap_err();
        match err {
            SchemaValidationError::ValidationFailed { violations, .. } => {
                assert!(violations
                    .violations()
                    .iter()
                    .any(|v| v.instance_path == "/metrics/sharpe_sim/value"));
            }
            other => panic!("expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn test_validate_schema_not_found() {
        let validator = SchemaValidator::new(schema_dir()).unwrap();
        let err = validator
            .validate_document(&json!({}), "nonexistent.schema.json")
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::SchemaLoadError { .. }));
    }

    #[test]
    fn test_unknown_remote_ref_is_permissive() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {"x": {"$ref": "https://example.invalid/other.schema.json"}}
        });
        SchemaValidator::empty()
            .validate_against(&json!({"x": 5}), &schema, "inline")
            .unwrap();
    }

    #[test]
    fn test_validate_jsonl_counts_records() {
        let schema = json!({"type": "object", "required": ["id"]});
        let text = "{\"id\": 1}\n\n{\"id\": 2}\n";
        let count = SchemaValidator::empty()
            .validate_jsonl(text, &schema, "inline")
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_validate_jsonl_reports_failing_line() {
        let schema = json!({"type": "object", "required": ["id"]});
        let text = "{\"id\": 1}\n\n{\"other\": 2}\n{\"id\": 3}\n";
        match SchemaValidator::empty().validate_jsonl(text, &schema, "inline") {
            Err(SchemaValidationError::InvalidLine { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("failed schema validation"));
            }
            other => panic!("expected InvalidLine, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_jsonl_reports_malformed_line() {
        let schema = json!({});
        match SchemaValidator::empty().validate_jsonl("{}\n{oops\n", &schema, "inline") {
            Err(SchemaValidationError::InvalidLine { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.starts_with("not valid JSON"));
            }
            other => panic!("expected InvalidLine, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_versioned_schema() {
        let current = schema_dir().join("manifest.schema.json");
        let v1 = schema_dir().join("manifest.schema.v1.json");

        assert_eq!(resolve_versioned_schema(&json!({"schema_version": "v1"}), &current), v1);
        assert_eq!(resolve_versioned_schema(&json!({"schema_version": "v1"}), &v1), v1);
        // No snapshot for v9 on disk.
        assert_eq!(
            resolve_versioned_schema(&json!({"schema_version": "v9"}), &current),
            current
        );
        assert_eq!(resolve_versioned_schema(&json!({}), &current), current);
        assert_eq!(
            resolve_versioned_schema(&json!({"schema_version": "  "}), &current),
            current
        );
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""model_id" is a required property"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn test_violation_display_path() {
        let v = Violation {
            instance_path: "/data_hash".to_string(),
            schema_path: "/properties/data_hash/pattern".to_string(),
            message: r#""xyz" does not match "^[a-f0-9]{64}$""#.to_string(),
        };
        let display = v.to_string();
        assert!(display.contains("/data_hash"));
        assert!(display.contains("does not match"));
    }
}
