//! Override tree checks
//!
//! Pairs every override with its upstream original and runs the define and
//! include checks over it. Files are checked in parallel; diagnostics are
//! buffered per file and emitted in walk order.

use crate::includes::check_includes;
use crate::validator::OverrideValidator;
use rayon::prelude::*;
use regex::Regex;
use srcoverlay_core::{Diagnostic, DiagnosticKind, DiagnosticSink, Error, Exclusions, Result};
use srcoverlay_parser::collect_override_paths;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Generated build directory for a build type and optional target
///
/// `<upstream>/out/<os>_<build>_<arch>/gen`, skipping absent parts.
pub fn generated_build_dir(
    upstream_root: &Path,
    build: &str,
    target_os: Option<&str>,
    target_arch: Option<&str>,
) -> PathBuf {
    let dir_name = [target_os, Some(build), target_arch]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    upstream_root.join("out").join(dir_name).join("gen")
}

/// Build one alternation out of regex fragments and literal paths
fn alternation<'a>(
    patterns: impl IntoIterator<Item = &'a str>,
    literals: impl IntoIterator<Item = &'a str>,
) -> Result<Option<Regex>> {
    let parts: Vec<String> = patterns
        .into_iter()
        .map(str::to_string)
        .chain(literals.into_iter().map(regex::escape))
        .collect();
    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(&parts.join("|"))?))
}

/// An override that could not be read
#[derive(Debug)]
pub struct FileFailure {
    pub path: String,
    pub error: Error,
}

/// Result of checking a set of overrides
#[derive(Debug, Default)]
pub struct TreeOutcome {
    /// Errors reported through the sink
    pub error_count: usize,
    /// Overrides whose check was aborted by an I/O failure
    pub failures: Vec<FileFailure>,
}

impl TreeOutcome {
    /// Total count, each failure counting as one error
    pub fn total(&self) -> usize {
        self.error_count + self.failures.len()
    }
}

/// Override sets split by where their originals live
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverrideSets {
    /// Originals in the upstream tree (generated dir as fallback)
    pub source: Vec<String>,
    /// Originals in the generated dir only
    pub grit: Vec<String>,
}

/// Checker for a whole overrides directory
pub struct OverrideChecker {
    validator: OverrideValidator,
    overrides_root: PathBuf,
    exclusions: Exclusions,
}

impl OverrideChecker {
    /// Create a checker for the overrides under `overrides_root`
    pub fn new(validator: OverrideValidator, overrides_root: PathBuf, exclusions: Exclusions) -> Self {
        Self {
            validator,
            overrides_root,
            exclusions,
        }
    }

    pub fn validator(&self) -> &OverrideValidator {
        &self.validator
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    pub fn overrides_root(&self) -> &Path {
        &self.overrides_root
    }

    /// Validate the exclusion table against the overrides directory
    pub fn validate_exclusions(&self, sink: &mut dyn DiagnosticSink) -> Result<usize> {
        crate::exclusions::validate_exclusions(
            &self.exclusions,
            &self.overrides_root,
            &self.validator.config().overrides_dir,
            sink,
        )
    }

    /// Discover overrides and split them into source and GRIT sets
    pub fn collect_overrides(&self) -> Result<OverrideSets> {
        let grit_pattern = self.validator.config().grit_pattern.as_str();
        let re_excludes = self.exclusions.re_path_excludes.iter().map(String::as_str);

        let source_exclude = alternation(
            re_excludes.clone().chain(std::iter::once(grit_pattern)),
            self.exclusions
                .path_excludes
                .iter()
                .chain(&self.exclusions.grit_includes)
                .map(String::as_str),
        )?;
        let source = collect_override_paths(&self.overrides_root, None, source_exclude.as_ref())?;

        let grit_include = alternation(
            std::iter::once(grit_pattern),
            self.exclusions.grit_includes.iter().map(String::as_str),
        )?;
        let grit_exclude = alternation(re_excludes, std::iter::empty())?;
        let grit = collect_override_paths(
            &self.overrides_root,
            grit_include.as_ref(),
            grit_exclude.as_ref(),
        )?;

        info!("{} source overrides, {} GRIT overrides", source.len(), grit.len());
        Ok(OverrideSets { source, grit })
    }

    /// Locate the original of an override
    fn locate_original(
        &self,
        override_path: &str,
        search_dir: &Path,
        gen_dir: Option<&Path>,
    ) -> Option<PathBuf> {
        let original = search_dir.join(override_path);
        if original.is_file() {
            return Some(original);
        }
        let generated = gen_dir?.join(override_path);
        if generated.is_file() {
            debug!("Using generated original for {}", override_path);
            return Some(generated);
        }
        None
    }

    /// Check a single override
    pub fn check_override(
        &self,
        override_path: &str,
        search_dir: &Path,
        gen_dir: Option<&Path>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize> {
        let Some(original) = self.locate_original(override_path, search_dir, gen_dir) else {
            sink.emit(
                Diagnostic::new(
                    DiagnosticKind::NoSourceForOverride,
                    override_path,
                    format!("No source for override {}", override_path),
                )
                .with_note("If this is not a true override, then add the path to PATH_EXCLUDES.")
                .with_note("Otherwise, the upstream file is gone and a fix is required."),
            );
            return Ok(1);
        };

        let override_file = self.overrides_root.join(override_path);
        let mut error_count = self.validator.check_against_original(
            override_path,
            &override_file,
            &original,
            &self.exclusions,
            sink,
        )?;

        let content = std::fs::read_to_string(&override_file)?;
        error_count += check_includes(override_path, &content, sink);
        Ok(error_count)
    }

    /// Check every override in `overrides` against originals in `search_dir`
    ///
    /// When `gen_dir` is given it is searched for originals missing from
    /// `search_dir`.
    pub fn check_tree(
        &self,
        overrides: &[String],
        search_dir: &Path,
        gen_dir: Option<&Path>,
        sink: &mut dyn DiagnosticSink,
    ) -> TreeOutcome {
        let results: Vec<(String, Vec<Diagnostic>, Result<usize>)> = overrides
            .par_iter()
            .map(|path| {
                let mut diagnostics: Vec<Diagnostic> = Vec::new();
                let result = self.check_override(path, search_dir, gen_dir, &mut diagnostics);
                (path.clone(), diagnostics, result)
            })
            .collect();

        let mut outcome = TreeOutcome::default();
        for (path, diagnostics, result) in results {
            for diagnostic in diagnostics {
                sink.emit(diagnostic);
            }
            match result {
                Ok(count) => outcome.error_count += count,
                Err(error) => outcome.failures.push(FileFailure { path, error }),
            }
        }

        debug!(
            "Checked {} overrides in {}: {} errors",
            overrides.len(),
            search_dir.display(),
            outcome.total()
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generated_build_dir() {
        let root = Path::new("/src");
        assert_eq!(
            generated_build_dir(root, "Component", None, None),
            PathBuf::from("/src/out/Component/gen")
        );
        assert_eq!(
            generated_build_dir(root, "Release", Some("android"), Some("arm64")),
            PathBuf::from("/src/out/android_Release_arm64/gen")
        );
        assert_eq!(
            generated_build_dir(root, "Debug", None, Some("x86")),
            PathBuf::from("/src/out/Debug_x86/gen")
        );
    }

    #[test]
    fn test_alternation_escapes_literals() {
        let re = alternation(["^third_party/.*"], ["base/a.h"]).unwrap().unwrap();
        assert!(re.is_match("third_party/x.cc"));
        assert!(re.is_match("base/a.h"));
        assert!(!re.is_match("base/aXh"));

        assert!(alternation(std::iter::empty(), std::iter::empty()).unwrap().is_none());
    }
}
