//! # Data-Collection Policy Comparison
//!
//! Compares the `export_manifest.data_collection` block of a manifest with
//! the canonical data-collection policy. Differences are advisory: they are
//! reported as warnings and never fail validation.

use serde_json::Value;

/// One manifest field and the policy field it is checked against.
struct PolicyCheck {
    manifest_field: &'static str,
    policy_pointer: &'static str,
    label: &'static str,
}

const CHECKS: [PolicyCheck; 5] = [
    PolicyCheck {
        manifest_field: "policy_version",
        policy_pointer: "/policy_version",
        label: "policy_version",
    },
    PolicyCheck {
        manifest_field: "session_timezone",
        policy_pointer: "/session_timezone",
        label: "session_timezone",
    },
    PolicyCheck {
        manifest_field: "l2_window",
        policy_pointer: "/l2_window_default",
        label: "l2_window vs policy l2_window_default",
    },
    PolicyCheck {
        manifest_field: "bar_lookbacks",
        policy_pointer: "/recommended_bar_lookbacks",
        label: "bar_lookbacks vs policy recommended_bar_lookbacks",
    },
    PolicyCheck {
        manifest_field: "symbol_policy_version",
        policy_pointer: "/symbol_policy/version",
        label: "symbol_policy_version",
    },
];

/// Render a value for a warning: strings bare, everything else as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compare `manifest` with `policy` and return human-readable warnings.
///
/// A manifest without a non-empty data-collection block yields a single
/// warning. Fields absent (or null) on either side are not compared.
pub fn compare_to_policy(manifest: &Value, policy: &Value) -> Vec<String> {
    let block = manifest
        .pointer("/export_manifest/data_collection")
        .and_then(Value::as_object)
        .filter(|dc| !dc.is_empty());
    let Some(dc) = block else {
        return vec![
            "manifest has no export_manifest.data_collection block; cannot compare to policy"
                .to_string(),
        ];
    };

    CHECKS
        .iter()
        .filter_map(|check| {
            let ours = dc.get(check.manifest_field).filter(|v| !v.is_null())?;
            let theirs = policy.pointer(check.policy_pointer).filter(|v| !v.is_null())?;
            (ours != theirs).then(|| {
                format!(
                    "data_collection.{} differs from policy (manifest={} policy={})",
                    check.label,
                    render(ours),
                    render(theirs)
                )
            })
        })
        .collect()
}
