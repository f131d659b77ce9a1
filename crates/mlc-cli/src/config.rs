//! # Configuration
//!
//! Every path the tools read or write, resolved once at startup and passed
//! to each handler.
//!
//! ## Resolution Order
//!
//! 1. Built-in defaults relative to the repository root.
//! 2. A YAML config file: `--config <path>`, or `contracts.yaml` at the
//!    root when present. Relative paths in the file resolve against the
//!    root.
//! 3. Environment overrides: `SCHEMA_DIR_OVERRIDE`,
//!    `CHECKSUM_DIR_OVERRIDE`, `OUT_DIR_OVERRIDE`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file looked up at the repository root when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "contracts.yaml";

/// Environment variable overriding the schema directory.
pub const SCHEMA_DIR_ENV: &str = "SCHEMA_DIR_OVERRIDE";
/// Environment variable overriding the checksum directory.
pub const CHECKSUM_DIR_ENV: &str = "CHECKSUM_DIR_OVERRIDE";
/// Environment variable overriding the report output directory.
pub const OUT_DIR_ENV: &str = "OUT_DIR_OVERRIDE";

/// Resolved paths for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractsConfig {
    /// Repository root.
    pub root: PathBuf,
    /// Directory holding `*.schema.json` and `*.schema.v*.json`.
    pub schema_dir: PathBuf,
    /// Directory holding `<schema>.sha256` records.
    pub checksum_dir: PathBuf,
    /// Directory reports are written to.
    pub out_dir: PathBuf,
    /// The promotion rule.
    pub rule_path: PathBuf,
    /// The current manifest schema.
    pub manifest_schema: PathBuf,
    /// Directory holding manifest fixtures.
    pub fixtures_dir: PathBuf,
    /// Published manifest hash artifact.
    pub artifact_path: PathBuf,
}

/// On-disk form of the config file. All fields optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    schema_dir: Option<PathBuf>,
    checksum_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    rule_path: Option<PathBuf>,
    manifest_schema: Option<PathBuf>,
    fixtures_dir: Option<PathBuf>,
    artifact_path: Option<PathBuf>,
}

impl ContractsConfig {
    /// Default layout under `root`.
    pub fn defaults(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            schema_dir: root.join("schemas"),
            checksum_dir: root.join("checksums"),
            out_dir: root.join("validation"),
            rule_path: root.join("rules").join("promotion.rule.json"),
            manifest_schema: root.join("schemas").join("manifest.schema.json"),
            fixtures_dir: root.join("fixtures"),
            artifact_path: root.join("artifacts").join("current_manifest_hash.json"),
        }
    }

    /// Resolve the configuration for `root` from all sources.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::defaults(root);

        let file = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => Some(root.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };
        if let Some(path) = file {
            config.apply_file(&path)?;
            tracing::debug!(config = %path.display(), "applied config file");
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply a YAML config file over the current values.
    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid config file {}", path.display()))?
        };

        let root = self.root.clone();
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };
        let fields = [
            (&mut self.schema_dir, file.schema_dir),
            (&mut self.checksum_dir, file.checksum_dir),
            (&mut self.out_dir, file.out_dir),
            (&mut self.rule_path, file.rule_path),
            (&mut self.manifest_schema, file.manifest_schema),
            (&mut self.fixtures_dir, file.fixtures_dir),
            (&mut self.artifact_path, file.artifact_path),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = resolve(value);
            }
        }
        Ok(())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides = [
            (SCHEMA_DIR_ENV, &mut self.schema_dir),
            (CHECKSUM_DIR_ENV, &mut self.checksum_dir),
            (OUT_DIR_ENV, &mut self.out_dir),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                tracing::debug!(key, value = %value, "environment override");
                *slot = PathBuf::from(value);
            }
        }
    }
}

/// Walk up from `start` to the first directory containing `schemas/`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("schemas").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_repository_layout() {
        let config = ContractsConfig::defaults(Path::new("/repo"));
        assert_eq!(config.schema_dir, PathBuf::from("/repo/schemas"));
        assert_eq!(config.checksum_dir, PathBuf::from("/repo/checksums"));
        assert_eq!(config.out_dir, PathBuf::from("/repo/validation"));
        assert_eq!(config.rule_path, PathBuf::from("/repo/rules/promotion.rule.json"));
        assert_eq!(
            config.manifest_schema,
            PathBuf::from("/repo/schemas/manifest.schema.json")
        );
        assert_eq!(
            config.artifact_path,
            PathBuf::from("/repo/artifacts/current_manifest_hash.json")
        );
    }

    #[test]
    fn config_file_paths_resolve_against_root() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("custom.yaml");
        std::fs::write(&cfg, "out_dir: build/reports\nrule_path: /abs/rule.json\n").unwrap();

        let mut config = ContractsConfig::defaults(dir.path());
        config.apply_file(&cfg).unwrap();
        assert_eq!(config.out_dir, dir.path().join("build/reports"));
        assert_eq!(config.rule_path, PathBuf::from("/abs/rule.json"));
        assert_eq!(config.schema_dir, dir.path().join("schemas"));
    }

    #[test]
    fn default_config_file_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "fixtures_dir: samples\n").unwrap();
        let config = ContractsConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.fixtures_dir, dir.path().join("samples"));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("bad.yaml");
        std::fs::write(&cfg, "schema_dirs: typo\n").unwrap();
        let err = ContractsConfig::load(dir.path(), Some(&cfg)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config file"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ContractsConfig::load(dir.path(), Some(&dir.path().join("absent.yaml"))).is_err());
    }

    #[test]
    fn empty_config_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("empty.yaml");
        std::fs::write(&cfg, "\n").unwrap();
        let mut config = ContractsConfig::defaults(dir.path());
        config.apply_file(&cfg).unwrap();
        assert_eq!(config, ContractsConfig::defaults(dir.path()));
    }

    #[test]
    fn environment_overrides_win() {
        let mut config = ContractsConfig::defaults(Path::new("/repo"));
        config.apply_env(|key| match key {
            SCHEMA_DIR_ENV => Some("/tmp/schemas".to_string()),
            OUT_DIR_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.schema_dir, PathBuf::from("/tmp/schemas"));
        assert_eq!(config.out_dir, PathBuf::from("/repo/validation"));
        assert_eq!(config.checksum_dir, PathBuf::from("/repo/checksums"));
    }

    #[test]
    fn repo_root_found_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("schemas")).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_repo_root(&nested), Some(dir.path().to_path_buf()));
    }
}
