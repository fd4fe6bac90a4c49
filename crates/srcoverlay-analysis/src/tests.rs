//! Scenario tests for the override validator
//!
//! Each test feeds an override file and its original as text and checks the
//! error count together with the diagnostics that were emitted.

use super::*;
use srcoverlay_core::{Diagnostic, DiagnosticKind, Exclusions, Severity};
use std::collections::{BTreeMap, BTreeSet};

fn run(
    override_path: &str,
    override_text: &str,
    original_text: &str,
    exclusions: &Exclusions,
) -> (usize, Vec<Diagnostic>) {
    let validator = OverrideValidator::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let errors = validator
        .check_text(
            override_path,
            override_text,
            "src/original.cc",
            original_text,
            exclusions,
            &mut diagnostics,
        )
        .unwrap();
    (errors, diagnostics)
}

fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}

fn excluding(path: &str, symbols: &[&str]) -> Exclusions {
    let mut symbol_excludes = BTreeMap::new();
    symbol_excludes.insert(
        path.to_string(),
        symbols.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
    );
    Exclusions {
        symbol_excludes,
        ..Exclusions::default()
    }
}

#[test]
fn test_paired_redefinition_present_in_original() {
    let override_text = "#define FOO FOO_Impl\n#include \"src/chrome/foo.cc\"\n#undef FOO\n";
    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "void FOO();\n", &Exclusions::default());

    assert_eq!(errors, 0);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_missing_cancellation() {
    let override_text = "#define FOO FOO_Impl\n";
    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "void FOO();\n", &Exclusions::default());

    assert_eq!(errors, 1);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::MissingCancellation]);
    assert!(diagnostics[0].notes.is_empty());

    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "void Bar();\n", &Exclusions::default());
    assert_eq!(errors, 2);
    assert_eq!(
        kinds(&diagnostics),
        vec![DiagnosticKind::MissingCancellation, DiagnosticKind::SymbolNotInOriginal]
    );
}

#[test]
fn test_symbol_not_in_original() {
    let override_text = "#define FOO FOO_Impl\n#undef FOO\n";
    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "void Bar();\n", &Exclusions::default());

    assert_eq!(errors, 1);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::SymbolNotInOriginal]);
    assert_eq!(
        diagnostics[0].to_string(),
        "ERROR: Unable to find symbol FOO in src/original.cc"
    );
}

#[test]
fn test_symbol_used_internally_is_only_noted() {
    let override_text = "#define FOO FOO_Impl\nvoid Wrap() { SomeFunc(FOO); }\n#undef FOO\n";
    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "void Bar();\n", &Exclusions::default());

    assert_eq!(errors, 0);
    assert_eq!(
        kinds(&diagnostics),
        vec![DiagnosticKind::SymbolNotInOriginalButUsedInternally]
    );
    assert_eq!(diagnostics[0].severity(), Severity::Info);
    assert_eq!(
        diagnostics[0].notes,
        vec![
            "Symbol is used internally in chromium_src/chrome/foo.cc".to_string(),
            "Symbol is NOT found in src/original.cc.".to_string(),
        ]
    );
}

#[test]
fn test_buildflag_accessor_is_checked_by_flag_name() {
    let override_text = "#define BUILDFLAG_INTERNAL_BAR() (1)\n#include \"src/base/flags.h\"\n#undef BUILDFLAG_INTERNAL_BAR\n";
    let original = "#if BUILDFLAG(BAR)\n#endif\n";
    let (errors, diagnostics) = run("base/flags.cc", override_text, original, &Exclusions::default());
    assert_eq!(errors, 0);
    assert!(diagnostics.is_empty());

    // The pairing check still uses the accessor name.
    let (errors, diagnostics) = run(
        "base/flags.cc",
        "#define BUILDFLAG_INTERNAL_BAR() (1)\n",
        original,
        &Exclusions::default(),
    );
    assert_eq!(errors, 1);
    assert!(diagnostics[0].message.contains("#undef BUILDFLAG_INTERNAL_BAR"));
}

#[test]
fn test_plain_buildflag_define_is_not_rewritten() {
    let override_text = "#define BUILDFLAG_INTERNAL_BAR BAR_Impl\n#undef BUILDFLAG_INTERNAL_BAR\n";
    let (errors, diagnostics) = run("base/flags.cc", override_text, "BAR\n", &Exclusions::default());

    assert_eq!(errors, 1);
    assert!(diagnostics[0].message.contains("BUILDFLAG_INTERNAL_BAR"));
}

#[test]
fn test_header_guard_is_exempt() {
    let override_text = "#ifndef BRAVE_CHROMIUM_SRC_CHROME_BROWSER_FOO_H_\n\
                         #define BRAVE_CHROMIUM_SRC_CHROME_BROWSER_FOO_H_\n\
                         #include \"src/chrome/browser/foo.h\"\n\
                         #endif\n";
    let (errors, diagnostics) = run("chrome/browser/foo.h", override_text, "", &Exclusions::default());

    assert_eq!(errors, 0);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_guard_name_is_not_exempt_in_source_files() {
    let override_text = "#define BRAVE_CHROMIUM_SRC_CHROME_BROWSER_FOO_CC_\n";
    let (errors, _) = run("chrome/browser/foo.cc", override_text, "", &Exclusions::default());
    assert_eq!(errors, 2);
}

#[test]
fn test_excluded_symbol_is_skipped() {
    let override_text = "#define ENABLE_FOO 1\n#define Bar Bar_Impl\n";
    let exclusions = excluding("chrome/browser/foo.h", &["ENABLE_FOO"]);
    let (errors, diagnostics) = run("chrome/browser/foo.h", override_text, "Bar\n", &exclusions);

    assert_eq!(errors, 1);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::MissingCancellation]);
    assert!(diagnostics[0].message.contains("#undef Bar"));
}

#[test]
fn test_exclusions_are_per_file() {
    let override_text = "#define ENABLE_FOO 1\n#undef ENABLE_FOO\n";
    let exclusions = excluding("chrome/browser/other.h", &["ENABLE_FOO"]);
    let (errors, _) = run("chrome/browser/foo.h", override_text, "ENABLE_FOO\n", &exclusions);
    assert_eq!(errors, 0);

    let (errors, _) = run("chrome/browser/foo.h", "#define ENABLE_FOO 1\n", "ENABLE_FOO\n", &exclusions);
    assert_eq!(errors, 1);
}

#[test]
fn test_header_guard_wins_over_exclusions() {
    let guard = "BRAVE_CHROMIUM_SRC_BASE_FOO_H_";
    let override_text = format!("#ifndef {0}\n#define {0}\n#endif\n", guard);
    let exclusions = excluding("base/foo.h", &[guard]);
    let (errors, diagnostics) = run("base/foo.h", &override_text, "", &exclusions);

    assert_eq!(errors, 0);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_cancellation_before_definition_does_not_close_it() {
    let override_text = "#undef FOO\n#define FOO FOO_Impl\n";
    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "FOO\n", &Exclusions::default());

    assert_eq!(errors, 1);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::MissingCancellation]);
}

#[test]
fn test_cancellation_before_definition_counts_as_internal_use() {
    let override_text = "#undef FOO\n#define FOO FOO_Impl\n#undef FOO\n";
    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "void Bar();\n", &Exclusions::default());

    assert_eq!(errors, 0);
    assert_eq!(
        kinds(&diagnostics),
        vec![DiagnosticKind::SymbolNotInOriginalButUsedInternally]
    );
}

#[test]
fn test_no_redefinitions_means_no_errors() {
    let override_text = "#include \"src/chrome/foo.cc\"\nnamespace {}\n";
    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "", &Exclusions::default());

    assert_eq!(errors, 0);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_commented_defines_are_ignored() {
    let override_text = "// #define FOO FOO_Impl\n/* #define BAR BAR_Impl */\n";
    let (errors, _) = run("chrome/foo.cc", override_text, "", &Exclusions::default());
    assert_eq!(errors, 0);
}

#[test]
fn test_errors_accumulate_across_symbols() {
    let override_text = "#define A A_Impl\n#define B(x) B_Impl(x)\n#define C C_Impl\n#undef C\n";
    let (errors, diagnostics) = run("chrome/foo.cc", override_text, "A B\n", &Exclusions::default());

    assert_eq!(errors, 3);
    assert_eq!(
        kinds(&diagnostics),
        vec![
            DiagnosticKind::MissingCancellation,
            DiagnosticKind::MissingCancellation,
            DiagnosticKind::SymbolNotInOriginal,
        ]
    );
}
