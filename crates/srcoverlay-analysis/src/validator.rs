//! Macro-override validation
//!
//! Checks that every `#define` in an override file is undone by a later
//! `#undef` and that the redefined symbol exists in the upstream original.
//! Header guards and symbols listed in the exclusion table are exempt.

use srcoverlay_core::{
    CheckConfig, Diagnostic, DiagnosticKind, DiagnosticSink, Exclusions, MacroKind, MacroMatch,
    Result, ValidationOutcome,
};
use srcoverlay_parser::{find_occurrences, get_extractor, strip_comments, DefineExtractor};
use std::path::Path;
use tracing::debug;

/// Validator for macro redefinitions in override files
pub struct OverrideValidator {
    config: CheckConfig,
    extractor: Box<dyn DefineExtractor>,
}

impl OverrideValidator {
    /// Create a validator with the default naming conventions
    pub fn new() -> Self {
        Self::with_config(CheckConfig::default())
    }

    /// Create a validator with custom naming conventions
    pub fn with_config(config: CheckConfig) -> Self {
        Self {
            config,
            extractor: get_extractor(),
        }
    }

    /// Replace the redefinition extractor
    pub fn with_extractor(mut self, extractor: Box<dyn DefineExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Extract redefinitions, in file order, from comment-stripped text
    pub fn extract_redefinitions(&self, text: &str) -> Vec<MacroMatch> {
        self.extractor.extract(text)
    }

    /// Header guard name derived from a repository-relative path
    ///
    /// `chrome/browser/foo-bar.h` becomes
    /// `BRAVE_CHROMIUM_SRC_CHROME_BROWSER_FOO_BAR_H_`.
    pub fn guard_name_for(&self, override_path: &str) -> String {
        let mangled: String = override_path
            .chars()
            .map(|c| match c {
                '\\' | '/' | '-' | '.' => '_',
                c => c,
            })
            .collect();
        format!("{}{}_", self.config.guard_prefix, mangled.to_uppercase())
    }

    /// Whether `symbol` is the header guard of the header at `override_path`
    pub fn is_header_guard(&self, override_path: &str, symbol: &str) -> bool {
        self.config.is_header(override_path) && symbol == self.guard_name_for(override_path)
    }

    /// Classify the occurrences of `symbol` in comment-stripped text
    ///
    /// The first definition wins; only an `#undef` strictly after it counts
    /// as its cancellation. An `#undef` before it counts as a use.
    pub fn outcome(&self, symbol: &str, text: &str) -> Result<ValidationOutcome> {
        let occurrences = find_occurrences(text, symbol)?;

        let definition = occurrences
            .iter()
            .find(|o| o.kind.is_definition())
            .map(|o| o.position);
        let cancellation_found = definition
            .map(|def| {
                occurrences
                    .iter()
                    .any(|o| o.kind == MacroKind::Cancellation && o.position > def)
            })
            .unwrap_or(false);

        Ok(ValidationOutcome {
            definition_found: definition.is_some(),
            cancellation_found,
            used_elsewhere: occurrences.iter().any(|o| match o.kind {
                MacroKind::Reference => true,
                MacroKind::Cancellation => definition.map_or(true, |def| o.position < def),
                _ => false,
            }),
        })
    }

    /// Validate one redefined symbol
    ///
    /// Returns the number of reported errors and whether the symbol is used
    /// elsewhere in the override.
    pub fn validate(
        &self,
        override_path: &str,
        symbol: &str,
        text: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(usize, bool)> {
        let outcome = self.outcome(symbol, text)?;
        let mut error_count = 0;

        if !outcome.definition_found {
            sink.emit(Diagnostic::new(
                DiagnosticKind::MissingDefinition,
                override_path,
                format!("Expected to find #define {} in {}.", symbol, override_path),
            ));
            error_count += 1;
        }

        if !outcome.cancellation_found {
            let mut diagnostic = Diagnostic::new(
                DiagnosticKind::MissingCancellation,
                override_path,
                format!("Expected to find #undef {} in {}.", symbol, override_path),
            );
            if self.config.is_header(override_path) {
                diagnostic = diagnostic.with_note(
                    "If this symbol is intended to propagate beyond this header then add it to SYMBOL_EXCLUDES.",
                );
            }
            sink.emit(diagnostic);
            error_count += 1;
        }

        Ok((error_count, outcome.used_elsewhere))
    }

    /// Check an override file against its upstream original on disk
    ///
    /// `override_path` is the repository-relative path used for guard names
    /// and exclusion lookups; `override_file` and `original_file` are read.
    /// The original is only read when the override redefines something.
    pub fn check_against_original(
        &self,
        override_path: &str,
        override_file: &Path,
        original_file: &Path,
        exclusions: &Exclusions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize> {
        let content = strip_comments(&std::fs::read_to_string(override_file)?);
        let matches = self.extract_redefinitions(&content);
        if matches.is_empty() {
            return Ok(0);
        }

        let original = strip_comments(&std::fs::read_to_string(original_file)?);
        let original_label = original_file.display().to_string();
        self.check_matches(
            override_path,
            &matches,
            &content,
            &original_label,
            &original,
            exclusions,
            sink,
        )
    }

    /// Check override text against original text
    pub fn check_text(
        &self,
        override_path: &str,
        override_text: &str,
        original_label: &str,
        original_text: &str,
        exclusions: &Exclusions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize> {
        let content = strip_comments(override_text);
        let matches = self.extract_redefinitions(&content);
        if matches.is_empty() {
            return Ok(0);
        }
        let original = strip_comments(original_text);
        self.check_matches(
            override_path,
            &matches,
            &content,
            original_label,
            &original,
            exclusions,
            sink,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn check_matches(
        &self,
        override_path: &str,
        matches: &[MacroMatch],
        content: &str,
        original_label: &str,
        original: &str,
        exclusions: &Exclusions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize> {
        let mut error_count = 0;

        for m in matches {
            if self.is_header_guard(override_path, &m.symbol) {
                debug!("Skipping header guard {} in {}", m.symbol, override_path);
                continue;
            }
            if exclusions.is_symbol_excluded(override_path, &m.symbol) {
                debug!("Skipping excluded symbol {} in {}", m.symbol, override_path);
                continue;
            }

            let (errors, used_elsewhere) = self.validate(override_path, &m.symbol, content, sink)?;
            error_count += errors;

            let target = match m.symbol.strip_prefix(self.config.buildflag_marker.as_str()) {
                Some(inner) if m.kind == MacroKind::FunctionLike => inner,
                _ => m.symbol.as_str(),
            };

            if original.contains(target) {
                continue;
            }

            if used_elsewhere {
                sink.emit(
                    Diagnostic::new(
                        DiagnosticKind::SymbolNotInOriginalButUsedInternally,
                        override_path,
                        format!("Ignoring symbol {}:", target),
                    )
                    .with_note(format!(
                        "Symbol is used internally in {}/{}",
                        self.config.overrides_dir,
                        override_path.replace('\\', "/")
                    ))
                    .with_note(format!("Symbol is NOT found in {}.", original_label)),
                );
            } else {
                sink.emit(Diagnostic::new(
                    DiagnosticKind::SymbolNotInOriginal,
                    override_path,
                    format!("Unable to find symbol {} in {}", target, original_label),
                ));
                error_count += 1;
            }
        }

        Ok(error_count)
    }
}

impl Default for OverrideValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_guard_name_for() {
        let validator = OverrideValidator::new();
        assert_eq!(
            validator.guard_name_for("chrome/browser/ui/foo-bar.h"),
            "BRAVE_CHROMIUM_SRC_CHROME_BROWSER_UI_FOO_BAR_H_"
        );
        assert_eq!(
            validator.guard_name_for("chrome\\browser\\foo.h"),
            "BRAVE_CHROMIUM_SRC_CHROME_BROWSER_FOO_H_"
        );
    }

    #[test]
    fn test_is_header_guard_round_trip() {
        let validator = OverrideValidator::new();
        for path in ["a.h", "chrome/browser/foo.h", "third_party/blink/some-file.h"] {
            let guard = validator.guard_name_for(path);
            assert!(validator.is_header_guard(path, &guard), "{}", path);
            assert!(!validator.is_header_guard(path, "FOO"));
        }
    }

    #[test]
    fn test_guard_requires_header_extension() {
        let validator = OverrideValidator::new();
        let guard = validator.guard_name_for("chrome/browser/foo.cc");
        assert!(!validator.is_header_guard("chrome/browser/foo.cc", &guard));
    }

    #[test]
    fn test_outcome_first_definition_wins() {
        let validator = OverrideValidator::new();
        let text = "#define FOO A\n#undef FOO\n#define FOO B\n";
        let outcome = validator.outcome("FOO", text).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome {
                definition_found: true,
                cancellation_found: true,
                used_elsewhere: false,
            }
        );
    }

    #[test]
    fn test_cancellation_before_definition_is_a_use() {
        let validator = OverrideValidator::new();
        let text = "#undef FOO\n#define FOO FOO_Impl\n";
        let outcome = validator.outcome("FOO", text).unwrap();
        assert!(outcome.definition_found);
        assert!(!outcome.cancellation_found);
        assert!(outcome.used_elsewhere);
    }

    #[test]
    fn test_validate_reports_missing_definition_and_cancellation() {
        let validator = OverrideValidator::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let (errors, used) = validator
            .validate("foo.cc", "FOO", "SomeFunc(FOO);\n", &mut diagnostics)
            .unwrap();

        assert_eq!(errors, 2);
        assert!(used);
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::MissingDefinition, DiagnosticKind::MissingCancellation]
        );
    }

    #[test]
    fn test_missing_cancellation_hint_for_headers() {
        let validator = OverrideValidator::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        validator
            .validate("foo.h", "FOO", "#define FOO FOO_Impl\n", &mut diagnostics)
            .unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].notes.len(), 1);
        assert!(diagnostics[0].notes[0].contains("SYMBOL_EXCLUDES"));
    }
}
