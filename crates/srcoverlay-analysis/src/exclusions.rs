//! Exclusion table validation
//!
//! Stale entries in the exclusion file hide nothing and should be removed,
//! so every listed path and symbol must still exist.

use regex::Regex;
use srcoverlay_core::{Diagnostic, DiagnosticKind, DiagnosticSink, Exclusions, Result};
use srcoverlay_parser::strip_comments;
use std::path::Path;
use tracing::debug;

fn check_path(
    overrides_root: &Path,
    overrides_dir: &str,
    path: &str,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    if overrides_root.join(path).exists() {
        return true;
    }
    sink.emit(
        Diagnostic::new(
            DiagnosticKind::MissingExclusionPath,
            path,
            format!(
                "Path listed in exclusions cannot be found: {}/{}",
                overrides_dir, path
            ),
        )
        .with_note("If the file was removed then also remove it from the exclusions list."),
    );
    false
}

fn check_symbol(
    content: &str,
    overrides_dir: &str,
    path: &str,
    symbol: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<bool> {
    let pattern = Regex::new(&format!(
        r"(?m)(?:^|[^A-Za-z0-9_]){}(?:[^A-Za-z0-9_]|$)",
        regex::escape(symbol)
    ))?;
    if pattern.is_match(content) {
        return Ok(true);
    }
    sink.emit(
        Diagnostic::new(
            DiagnosticKind::MissingExclusionSymbol,
            path,
            format!(
                "Symbol {} listed in exclusions for override {}/{} cannot be found.",
                symbol, overrides_dir, path
            ),
        )
        .with_note("If the symbol was removed then also remove it from the exclusions list."),
    );
    Ok(false)
}

/// Validate that excluded paths and symbols still exist under `overrides_root`
///
/// Returns the number of stale entries.
pub fn validate_exclusions(
    exclusions: &Exclusions,
    overrides_root: &Path,
    overrides_dir: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<usize> {
    let mut error_count = 0;

    for path in exclusions.path_excludes.iter().chain(&exclusions.grit_includes) {
        if !check_path(overrides_root, overrides_dir, path, sink) {
            error_count += 1;
        }
    }

    for (path, symbols) in &exclusions.symbol_excludes {
        if !check_path(overrides_root, overrides_dir, path, sink) {
            error_count += 1;
            continue;
        }
        let content = strip_comments(&std::fs::read_to_string(overrides_root.join(path))?);
        for symbol in symbols {
            if !check_symbol(&content, overrides_dir, path, symbol, sink)? {
                error_count += 1;
            }
        }
    }

    debug!("Exclusion validation found {} stale entries", error_count);
    Ok(error_count)
}
