//! JSON report output.
//!
//! Reports are pretty-printed with two-space indentation, keys sorted at
//! every depth, and a trailing newline, so regenerated files diff cleanly.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Render `value` as sorted, pretty JSON without a trailing newline.
pub fn render_pretty(value: &impl Serialize) -> Result<String> {
    let tree = serde_json::to_value(value).context("report is not representable as JSON")?;
    let sorted = mlc_core::canonicalize(tree);
    Ok(serde_json::to_string_pretty(&sorted)?)
}

/// Write `value` to `path`, creating parent directories as needed.
pub fn write_report(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let mut text = render_pretty(value)?;
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
    tracing::debug!(report = %path.display(), "wrote report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_sorted_at_every_depth() {
        let text = render_pretty(&json!({"b": {"z": 1, "a": 2}, "a": [ {"y": 0, "x": 0} ]})).unwrap();
        let a = text.find("\"a\"").unwrap();
        let b = text.find("\"b\"").unwrap();
        assert!(a < b);
        assert!(text.find("\"x\"").unwrap() < text.find("\"y\"").unwrap());
        assert!(text.contains("\n  \"a\""));
    }

    #[test]
    fn creates_parent_dirs_and_ends_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.json");
        write_report(&path, &json!({"ok": true})).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"ok\": true\n}\n");
    }
}
