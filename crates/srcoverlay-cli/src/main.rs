//! srcoverlay CLI
//!
//! Command-line interface for the override checks and feature splicing.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use srcoverlay_analysis::{generated_build_dir, OverrideChecker, OverrideValidator};
use srcoverlay_core::{CheckConfig, Diagnostic, DiagnosticSink, Exclusions};
use srcoverlay_features::{FeatureCompiler, VendorFeatureExtensions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const SECTION_RULE: &str = "--------------------------------------------------";
const DIAGNOSTIC_RULE: &str = "-------------------------";

#[derive(Parser)]
#[command(name = "srcoverlay")]
#[command(author, version, about = "Consistency checks for upstream source overlays", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the override directory against the upstream tree
    Check {
        /// Build type (Component, Static, Debug, Release)
        #[arg(value_name = "BUILD", default_value = "Component")]
        build: String,

        /// Target OS (android, win, linux, mac, ios)
        #[arg(long)]
        os: Option<String>,

        /// Target architecture (x86, x64, arm, arm64)
        #[arg(long)]
        arch: Option<String>,

        /// Overlay root holding the overrides directory
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Upstream source root (default: parent of the overlay root)
        #[arg(long)]
        upstream: Option<PathBuf>,

        /// Exclusion file (default: script/check_chromium_src.json under the root)
        #[arg(long)]
        exclusions: Option<PathBuf>,
    },

    /// Load feature files, splice vendor entries and write the table
    Features {
        /// Build directory the source paths are relative to
        #[arg(long)]
        root: PathBuf,

        /// Output file for the merged table
        #[arg(short, long)]
        output: PathBuf,

        /// Feature files, `../../`-prefixed
        #[arg(value_name = "SOURCE", required = true)]
        sources: Vec<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            build,
            os,
            arch,
            root,
            upstream,
            exclusions,
        } => cmd_check(
            &build,
            os.as_deref(),
            arch.as_deref(),
            &root,
            upstream.as_deref(),
            exclusions.as_deref(),
        ),
        Commands::Features {
            root,
            output,
            sources,
        } => {
            cmd_features(&root, &output, sources)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Diagnostic sink printing each diagnostic followed by a rule
struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        println!("{}", diagnostic);
        println!("{}", DIAGNOSTIC_RULE);
    }
}

fn print_section(title: &str) {
    println!("{}", SECTION_RULE);
    println!("{}", title);
    println!("{}", SECTION_RULE);
}

/// Process exit status for an error count
fn exit_status(error_count: usize) -> u8 {
    error_count.min(u8::MAX as usize) as u8
}

fn cmd_check(
    build: &str,
    os: Option<&str>,
    arch: Option<&str>,
    root: &Path,
    upstream: Option<&Path>,
    exclusions: Option<&Path>,
) -> Result<ExitCode> {
    let config = CheckConfig::default();

    if !root.is_dir() {
        println!("ERROR: {} is not a valid directory.", root.display());
        return Ok(ExitCode::FAILURE);
    }
    let root = std::fs::canonicalize(root)
        .with_context(|| format!("Failed to resolve {}", root.display()))?;
    let upstream = match upstream {
        Some(dir) => dir.to_path_buf(),
        None => root
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("{} has no parent directory", root.display()))?,
    };
    let gen_dir = generated_build_dir(&upstream, build, os, arch);
    debug!("Upstream {}, generated {}", upstream.display(), gen_dir.display());

    for dir in [&upstream, &gen_dir] {
        if !dir.is_dir() {
            println!("ERROR: {} is not a valid directory.", dir.display());
            return Ok(ExitCode::FAILURE);
        }
    }

    print_section("Loading exclusions...");
    let exclusions_path = exclusions
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(&config.exclusions_file));
    let exclusions = match Exclusions::from_file(&exclusions_path) {
        Ok(exclusions) => exclusions,
        Err(e) => {
            println!(
                "ERROR: Unable to load exclusions file {}.",
                exclusions_path.display()
            );
            println!("       {}", e);
            println!("{}", DIAGNOSTIC_RULE);
            return Ok(ExitCode::FAILURE);
        }
    };

    let overrides_root = root.join(&config.overrides_dir);
    let checker = OverrideChecker::new(
        OverrideValidator::with_config(config),
        overrides_root,
        exclusions,
    );
    let mut sink = ConsoleSink;

    print_section("Validating exclusions...");
    let mut error_count = checker.validate_exclusions(&mut sink)?;
    if error_count == 0 {
        println!("OK.");
    }

    let sets = checker
        .collect_overrides()
        .with_context(|| format!("Failed to walk {}", checker.overrides_root().display()))?;
    info!(
        "Found {} source and {} GRIT overrides",
        sets.source.len(),
        sets.grit.len()
    );

    error_count += check_overrides(&checker, &sets.source, &upstream, Some(gen_dir.as_path()), &mut sink);
    error_count += check_overrides(&checker, &sets.grit, &gen_dir, None, &mut sink);

    if error_count > 0 {
        println!("{}", SECTION_RULE);
        println!("Found {} error(s).", error_count);
    }
    Ok(ExitCode::from(exit_status(error_count)))
}

fn check_overrides(
    checker: &OverrideChecker,
    overrides: &[String],
    search_dir: &Path,
    gen_dir: Option<&Path>,
    sink: &mut ConsoleSink,
) -> usize {
    print_section(&format!("Checking overrides in {} ...", search_dir.display()));

    let outcome = checker.check_tree(overrides, search_dir, gen_dir, sink);
    for failure in &outcome.failures {
        println!("ERROR: Unable to check override {}", failure.path);
        println!("       {}", failure.error);
        println!("{}", DIAGNOSTIC_RULE);
    }

    let total = outcome.total();
    if total == 0 {
        println!("OK.");
    }
    total
}

fn cmd_features(root: &Path, output: &Path, sources: Vec<String>) -> Result<()> {
    let mut compiler = FeatureCompiler::new(root, sources)
        .with_mutator(Box::new(VendorFeatureExtensions::new()?));
    compiler.load()?;

    let table = compiler.into_table();
    let json = serde_json::to_string_pretty(&table)?;
    std::fs::write(output, &json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} features to {}", table.len(), output.display());

    Ok(())
}
