//! # Schema Change Classification
//!
//! Labels an edit from one schema revision to the next so that reviewers
//! know whether consumers must be migrated.
//!
//! ## Rules
//!
//! Evaluated in order, first match wins:
//!
//! 1. A root `required` entry was dropped: **breaking**.
//! 2. A root property was removed (required or not): **breaking**.
//! 3. Root properties were added: **additive**.
//! 4. Structural hashes are equal: **none**.
//! 5. Anything else: **other**.
//!
//! Only the root `required` and `properties` are compared. An edit deep
//! inside a property sub-schema surfaces as `other`.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::hash::structural_hash;

/// Classification of a schema edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeClass {
    /// Structurally identical.
    None,
    /// Only new root properties.
    Additive,
    /// A consumer relying on the old schema may break.
    Breaking,
    /// Structural change not covered by the root-level rules.
    Other,
}

impl ChangeClass {
    /// The lowercase label used in reports and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Additive => "additive",
            Self::Breaking => "breaking",
            Self::Other => "other",
        }
    }

    /// True for [`ChangeClass::Breaking`].
    pub fn is_breaking(&self) -> bool {
        matches!(self, Self::Breaking)
    }
}

impl fmt::Display for ChangeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String entries of the root `required` array. Anything else is empty.
fn required_set(schema: &Value) -> BTreeSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Keys of the root `properties` object. Anything else is empty.
fn property_keys(schema: &Value) -> BTreeSet<&str> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Classify the edit from `old` to `new`.
pub fn classify_change(old: &Value, new: &Value) -> ChangeClass {
    if !required_set(new).is_superset(&required_set(old)) {
        return ChangeClass::Breaking;
    }

    let old_props = property_keys(old);
    let new_props = property_keys(new);
    if !new_props.is_superset(&old_props) {
        return ChangeClass::Breaking;
    }
    if new_props != old_props {
        return ChangeClass::Additive;
    }

    if structural_hash(old) == structural_hash(new) {
        ChangeClass::None
    } else {
        ChangeClass::Other
    }
}
