//! # mlc CLI entry point
//!
//! Parses command-line arguments, resolves the repository root and
//! configuration, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mlc_cli::checksums::{run_checksums, run_manifest_hash, ManifestHashArgs};
use mlc_cli::classify::{run_classify, ClassifyArgs};
use mlc_cli::config::{find_repo_root, ContractsConfig};
use mlc_cli::fixtures::run_fixtures;
use mlc_cli::promote::{run_promote, PromoteArgs};
use mlc_cli::schemas::run_schemas;
use mlc_cli::summary::run_all;
use mlc_cli::validate::{run_validate, ValidateArgs};

/// ML contracts toolchain.
///
/// Keeps manifest schemas, checksum baselines and the promotion rule
/// consistent: drift detection, change classification, manifest
/// validation and promotion gating.
#[derive(Parser, Debug)]
#[command(name = "mlc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Repository root. Defaults to the nearest ancestor holding `schemas/`.
    #[arg(long, global = true, env = "MLC_ROOT")]
    root: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Audit every schema and check it against its checksum baseline.
    Schemas,

    /// Rewrite snapshot baselines and the manifest hash artifact.
    Checksums,

    /// Print the manifest schema hash, optionally publishing it.
    ManifestHash(ManifestHashArgs),

    /// Classify the change between two schema revisions.
    Classify(ClassifyArgs),

    /// Validate manifests, bars JSONL and coverage documents.
    Validate(ValidateArgs),

    /// Check that every manifest fixture behaves as its name says.
    Fixtures,

    /// Audit the promotion rule and gate a manifest.
    Promote(PromoteArgs),

    /// Run every audit and print a one-line summary.
    All,
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG, when set, wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("mlc CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let repo_root = cli.root.clone().unwrap_or_else(|| {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        find_repo_root(&cwd).unwrap_or_else(|| {
            tracing::warn!("Could not locate repository root; using current directory");
            cwd
        })
    });
    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let config = match ContractsConfig::load(&repo_root, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Schemas => run_schemas(&config),
        Commands::Checksums => run_checksums(&config),
        Commands::ManifestHash(args) => run_manifest_hash(&args, &config),
        Commands::Classify(args) => run_classify(&args, &config),
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Fixtures => run_fixtures(&config),
        Commands::Promote(args) => run_promote(&args, &config),
        Commands::All => run_all(&config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mlc_cli::validate::ValidateTarget;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mlc", "schemas", "-vv", "--root", "/repo"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, Some(PathBuf::from("/repo")));
        assert!(matches!(cli.command, Commands::Schemas));
    }

    #[test]
    fn parses_manifest_hash_flags() {
        let cli = Cli::try_parse_from([
            "mlc",
            "manifest-hash",
            "--write-artifact",
            "--artifact-path",
            "out/hash.json",
        ])
        .unwrap();
        let Commands::ManifestHash(args) = cli.command else {
            panic!("expected manifest-hash");
        };
        assert!(args.write_artifact);
        assert_eq!(args.artifact_path, Some(PathBuf::from("out/hash.json")));
        assert!(args.schema.is_none());
    }

    #[test]
    fn parses_validate_manifest_with_policy() {
        let cli = Cli::try_parse_from([
            "mlc",
            "validate",
            "manifest",
            "m.json",
            "--policy",
            "p.json",
        ])
        .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        match args.target {
            ValidateTarget::Manifest(m) => {
                assert_eq!(m.path, PathBuf::from("m.json"));
                assert_eq!(m.policy, Some(PathBuf::from("p.json")));
            }
            other => panic!("expected manifest target, got {other:?}"),
        }
    }

    #[test]
    fn promote_requires_manifest_unless_audit_only() {
        assert!(Cli::try_parse_from(["mlc", "promote"]).is_err());
        let cli = Cli::try_parse_from(["mlc", "promote", "--audit-only"]).unwrap();
        let Commands::Promote(args) = cli.command else {
            panic!("expected promote");
        };
        assert!(args.audit_only);
        assert!(args.manifest.is_none());
    }

    #[test]
    fn classify_takes_two_positionals() {
        assert!(Cli::try_parse_from(["mlc", "classify", "old.json"]).is_err());
        assert!(Cli::try_parse_from(["mlc", "classify", "old.json", "new.json"]).is_ok());
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["mlc", "deploy"]).is_err());
    }
}
