//! Macro definition scanning
//!
//! Finds `#define` redefinitions in override files and classifies every
//! occurrence of a given symbol as definition, cancellation or reference.
//!
//! Extraction and occurrence scanning share the `#define[\s\\]+` directive
//! shape so a symbol found by one is always found by the other.

use crate::DefineExtractor;
use regex::Regex;
use srcoverlay_core::{MacroKind, MacroMatch, Result};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::debug;

/// `#define FooBar FooBar_ChromiumImpl`
static PLAIN_DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^#define[\s\\]+([a-zA-Z0-9_]+[^\s\(]*)(?:[ \t]+\\\s*|[ \t])?([a-zA-Z0-9_]+[^\s\(]*)?$",
    )
    .expect("plain define pattern")
});

/// `#define FooBar(P1, P2) FooBar_ChromiumImpl(P1, P2, p3)`
static FUNCTION_DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^#define[\s\\]+([a-zA-Z0-9_]+)[\s\\]*\(.*?\)(?:[ \t]+\\\s*|[ \t])?([a-zA-Z0-9_]*[\s\\]*\(.*?\))?",
    )
    .expect("function-like define pattern")
});

const WORD_START: &str = r"(?:^|[^A-Za-z0-9_])";
const WORD_END: &str = r"(?:[^A-Za-z0-9_]|$)";

/// Regex-based redefinition extractor
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexDefineExtractor;

impl RegexDefineExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    fn collect(re: &Regex, kind: MacroKind, text: &str, out: &mut Vec<MacroMatch>) {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(symbol)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push(MacroMatch::new(symbol.as_str(), kind, whole.start()));
        }
    }
}

impl DefineExtractor for RegexDefineExtractor {
    fn extract(&self, text: &str) -> Vec<MacroMatch> {
        let mut matches = Vec::new();
        Self::collect(&PLAIN_DEFINE, MacroKind::Plain, text, &mut matches);
        Self::collect(&FUNCTION_DEFINE, MacroKind::FunctionLike, text, &mut matches);
        matches.sort_by_key(|m| m.position);
        debug!("Extracted {} redefinitions", matches.len());
        matches
    }

    fn name(&self) -> &str {
        "regex"
    }
}

/// Byte offsets at which each line of `text` starts
fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_start_of(starts: &[usize], offset: usize) -> usize {
    match starts.binary_search(&offset) {
        Ok(i) => starts[i],
        Err(i) => starts[i - 1],
    }
}

/// Find every occurrence of `symbol` in comment-stripped text
///
/// Directive lines (`#define SYMBOL`, `#undef SYMBOL`) are reported once with
/// their directive kind. Every other line mentioning `symbol` as a whole word
/// is reported once as [`MacroKind::Reference`]. Positions are byte offsets
/// of the line (or directive) start; the result is sorted by position.
pub fn find_occurrences(text: &str, symbol: &str) -> Result<Vec<MacroMatch>> {
    let escaped = regex::escape(symbol);
    let define_re = Regex::new(&format!(r"(?m)^#define[\s\\]+({}){}", escaped, WORD_END))?;
    let undef_re = Regex::new(&format!(r"(?m)^#undef[\s\\]+({}){}", escaped, WORD_END))?;
    let word_re = Regex::new(&format!(r"(?m){}({}){}", WORD_START, escaped, WORD_END))?;

    let starts = line_starts(text);
    let mut directive_lines = BTreeSet::new();
    let mut occurrences = Vec::new();

    for caps in define_re.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let kind = if text[name.end()..].trim_start_matches([' ', '\t']).starts_with('(') {
            MacroKind::FunctionLike
        } else {
            MacroKind::Plain
        };
        directive_lines.insert(line_start_of(&starts, name.start()));
        occurrences.push(MacroMatch::new(symbol, kind, whole.start()));
    }

    for caps in undef_re.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        directive_lines.insert(line_start_of(&starts, name.start()));
        occurrences.push(MacroMatch::new(symbol, MacroKind::Cancellation, whole.start()));
    }

    let mut reference_lines = BTreeSet::new();
    for caps in word_re.captures_iter(text) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        let line = line_start_of(&starts, name.start());
        if !directive_lines.contains(&line) {
            reference_lines.insert(line);
        }
    }
    occurrences.extend(
        reference_lines
            .into_iter()
            .map(|line| MacroMatch::new(symbol, MacroKind::Reference, line)),
    );

    occurrences.sort_by_key(|m| m.position);
    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> Vec<(String, MacroKind)> {
        RegexDefineExtractor::new()
            .extract(text)
            .into_iter()
            .map(|m| (m.symbol, m.kind))
            .collect()
    }

    #[test]
    fn test_extract_plain_define() {
        let text = "#define FooBar FooBar_ChromiumImpl\n#include \"src/foo.h\"\n#undef FooBar\n";
        assert_eq!(extract(text), vec![("FooBar".to_string(), MacroKind::Plain)]);
    }

    #[test]
    fn test_extract_function_like_define() {
        let text = "#define FooBar(P1, P2) FooBar_ChromiumImpl(P1, P2, p3)\n";
        assert_eq!(extract(text), vec![("FooBar".to_string(), MacroKind::FunctionLike)]);
    }

    #[test]
    fn test_extract_across_continuation() {
        let text = "#define LongSymbolName \\\n  LongSymbolName_ChromiumImpl\n";
        assert_eq!(extract(text), vec![("LongSymbolName".to_string(), MacroKind::Plain)]);
    }

    #[test]
    fn test_extract_bare_define() {
        let text = "#ifndef GUARD_H_\n#define GUARD_H_\n#endif\n";
        assert_eq!(extract(text), vec![("GUARD_H_".to_string(), MacroKind::Plain)]);
    }

    #[test]
    fn test_extract_buildflag_accessor() {
        let text = "#define BUILDFLAG_INTERNAL_BAR() (1)\n";
        assert_eq!(
            extract(text),
            vec![("BUILDFLAG_INTERNAL_BAR".to_string(), MacroKind::FunctionLike)]
        );
    }

    #[test]
    fn test_extract_preserves_file_order() {
        let text = "#define Alpha(x) Alpha_Impl(x)\n#define Beta Beta_Impl\n";
        assert_eq!(
            extract(text),
            vec![
                ("Alpha".to_string(), MacroKind::FunctionLike),
                ("Beta".to_string(), MacroKind::Plain),
            ]
        );
    }

    #[test]
    fn test_string_values_are_not_redefinitions() {
        assert!(extract("#define kName \"name\"\n").is_empty());
    }

    #[test]
    fn test_occurrences_are_classified() {
        let text = "#define FOO FOO_Impl\nvoid f() { SomeFunc(FOO); }\n#undef FOO\nint FOOBAR;\n";
        let kinds: Vec<MacroKind> = find_occurrences(text, "FOO")
            .unwrap()
            .into_iter()
            .map(|m| m.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![MacroKind::Plain, MacroKind::Reference, MacroKind::Cancellation]
        );
    }

    #[test]
    fn test_occurrences_do_not_match_prefixes() {
        let text = "#define FOOBAR 1\n#undef FOOBAR\nFOO_X();\n";
        assert!(find_occurrences(text, "FOO").unwrap().is_empty());
    }

    #[test]
    fn test_occurrence_continuation_line_is_definition() {
        let text = "#define \\\n  FOO FOO_Impl\n#undef FOO\n";
        let kinds: Vec<MacroKind> = find_occurrences(text, "FOO")
            .unwrap()
            .into_iter()
            .map(|m| m.kind)
            .collect();

        assert_eq!(kinds, vec![MacroKind::Plain, MacroKind::Cancellation]);
    }
}
