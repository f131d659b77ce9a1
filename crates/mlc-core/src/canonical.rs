//! # Canonical Form — Order-Independent JSON Bytes
//!
//! This module defines [`canonicalize`], the key-ordering rewrite applied
//! to every document before hashing, and [`CanonicalBytes`], the sole
//! construction path for bytes used in digest computation.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which canonicalizes the
//! value before serializing it. Any function requiring bytes for digest
//! computation must accept `&CanonicalBytes`, so a digest over a
//! non-canonical serialization cannot be produced by accident.
//!
//! ## Byte Format
//!
//! The canonical byte sequence is the compact JSON encoding of the
//! canonical form:
//!
//! 1. **Sorted keys** — every object's keys in ascending code point order,
//!    recursively.
//! 2. **Compact separators** — `,` and `:` with no whitespace.
//! 3. **ASCII only** — every character above `~` (U+007E) inside a string
//!    is written as a `\uXXXX` escape with lowercase hex digits, using a
//!    UTF-16 surrogate pair above the Basic Multilingual Plane.
//!
//! This is byte-for-byte the output of the pipeline's Python tooling
//! (`json.dumps(obj, sort_keys=True, separators=(",", ":"))`), so baselines
//! recorded by either side verify on the other. Numbers follow Python's
//! `repr` rules:
//!
//! - Integers keep every digit, including those wider than 64 bits
//!   (serde_json's `arbitrary_precision` keeps the literal text).
//! - Floats use the shortest round-trip digits, fixed notation for decimal
//!   exponents in `-4..16` with a trailing `.0` when integral, and
//!   otherwise `d.ddde±XX` with a signed exponent of at least two digits
//!   (`1e-07`, `1.5e+16`).
//! - Non-finite floats, reachable only through literals such as `1e400`,
//!   are written `Infinity` / `-Infinity` as Python writes them.

use std::fmt;
use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

/// Recursively rewrite `value` so every object's keys appear in ascending
/// lexical order.
///
/// Arrays keep their element order and are canonicalized element-wise;
/// scalars pass through unchanged. The result depends only on the content
/// of `value`, never on the insertion order of its keys.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            // Inserting in sorted order keeps the result sorted whether the
            // map is ordered by key or by insertion.
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        scalar => scalar,
    }
}

/// Bytes produced exclusively by canonical serialization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - All object keys are sorted, recursively.
/// - No insignificant whitespace.
/// - Pure ASCII: non-ASCII string content is `\u`-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(String);

impl CanonicalBytes {
    /// Construct canonical bytes from a JSON value.
    ///
    /// Total over the JSON data model: every `Value` has exactly one
    /// canonical byte sequence.
    pub fn new(value: &Value) -> Self {
        let canonical = canonicalize(value.clone());
        Self(PythonJson(&canonical).to_string())
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The canonical encoding as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Compact JSON text in the byte format of Python's `json.dumps`.
struct PythonJson<'a>(&'a Value);

impl fmt::Display for PythonJson<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, PythonFormatter);
        self.0.serialize(&mut ser).map_err(|_| fmt::Error)?;
        f.write_str(std::str::from_utf8(&out).map_err(|_| fmt::Error)?)
    }
}

/// Compact formatter that writes numbers the way Python's `repr` does and
/// escapes every character above `~` as `\uXXXX`.
struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(python_float_repr(f64::from(value)).as_bytes())
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(python_float_repr(value).as_bytes())
    }

    fn write_number_str<W>(&mut self, writer: &mut W, value: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(normalize_number_literal(value).as_bytes())
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if u32::from(ch) > 0x7e {
                writer.write_all(fragment[start..i].as_bytes())?;
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
                start = i + ch.len_utf8();
            }
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Rewrite a JSON number literal as Python would after `json.loads`.
///
/// Integer literals stay integers of any width (`-0` becomes `0`); any
/// literal with a fraction or exponent becomes a float.
fn normalize_number_literal(literal: &str) -> String {
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if digits.bytes().all(|b| b == b'0') {
            return "0".to_string();
        }
        return literal.to_string();
    }
    match literal.parse::<f64>() {
        Ok(value) => python_float_repr(value),
        Err(_) => literal.to_string(),
    }
}

/// Format `value` exactly as Python's `repr(float)`.
fn python_float_repr(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `-1.25e-7`.
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::from(sign);
    if (-4..16).contains(&exponent) {
        if exponent < 0 {
            out.push_str("0.");
            out.push_str(&"0".repeat((-exponent - 1) as usize));
            out.push_str(&digits);
        } else {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                out.push_str(&digits);
                out.push_str(&"0".repeat(int_len - digits.len()));
                out.push_str(".0");
            } else {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            }
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        out.push_str(&format!("e{exp_sign}{:02}", exponent.unsigned_abs()));
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for arbitrary JSON trees. Floats are restricted to quarter
    /// steps so that text round-trips are exact.
    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            any::<i32>().prop_map(|n| serde_json::json!(f64::from(n) / 4.0)),
            "\\PC{0,20}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-zA-Z_$]{1,10}", inner, 0..8).prop_map(|m| {
                    let map: Map<String, Value> = m.into_iter().collect();
                    Value::Object(map)
                }),
            ]
        })
    }

    proptest! {
        /// Canonicalization is idempotent.
        #[test]
        fn canonicalize_idempotent(value in json_value()) {
            let once = canonicalize(value);
            let twice = canonicalize(once.clone());
            prop_assert_eq!(once, twice);
        }

        /// Canonicalization preserves content: the result is equal to the
        /// input as a JSON value.
        #[test]
        fn canonicalize_preserves_content(value in json_value()) {
            prop_assert_eq!(canonicalize(value.clone()), value);
        }

        /// Canonical bytes are pure ASCII.
        #[test]
        fn canonical_bytes_ascii(value in json_value()) {
            prop_assert!(CanonicalBytes::new(&value).as_bytes().is_ascii());
        }

        /// Canonical bytes parse back to the same value.
        #[test]
        fn canonical_bytes_round_trip(value in json_value()) {
            let cb = CanonicalBytes::new(&value);
            let parsed: Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(parsed, value);
        }

        /// Insertion order of keys never reaches the canonical bytes.
        #[test]
        fn canonical_bytes_ignore_insertion_order(
            entries in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 1..10)
        ) {
            let forward: Map<String, Value> = entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect();
            let backward: Map<String, Value> = entries
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect();
            prop_assert_eq!(
                CanonicalBytes::new(&Value::Object(forward)),
                CanonicalBytes::new(&Value::Object(backward))
            );
        }
    }
}
