//! Comment stripping
//!
//! Textual removal of `/* */` and `//` comments. Only the relative order of
//! what remains matters to callers, not the original coordinates.

use regex::Regex;
use std::sync::LazyLock;

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("block comment pattern"));

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]*//.*$").expect("line comment pattern"));

/// Strip C/C++ comments from file content
///
/// Line endings are normalized to `\n` first.
pub fn strip_comments(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let stripped = BLOCK_COMMENT.replace_all(&normalized, "");
    LINE_COMMENT.replace_all(&stripped, "").into_owned()
}
