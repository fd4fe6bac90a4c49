//! `#include` directive recognition

use regex::Regex;
use std::sync::LazyLock;

static SRC_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^#include "src/(.*)""#).expect("src include pattern"));

static GEN_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^#include "\.\./gen/(.*)""#).expect("gen include pattern"));

static QUOTED_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^#include "(.*)""#).expect("quoted include pattern"));

/// A quoted `#include` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeDirective<'a> {
    /// `#include "src/<target>"`
    SrcPrefixed(&'a str),
    /// `#include "../gen/<target>"`
    GenPrefixed(&'a str),
    /// Any other quoted include
    Quoted(&'a str),
}

impl<'a> IncludeDirective<'a> {
    /// Recognize a quoted include at the start of `line`
    pub fn parse(line: &'a str) -> Option<Self> {
        if let Some(caps) = SRC_INCLUDE.captures(line) {
            return caps.get(1).map(|m| Self::SrcPrefixed(m.as_str()));
        }
        if let Some(caps) = GEN_INCLUDE.captures(line) {
            return caps.get(1).map(|m| Self::GenPrefixed(m.as_str()));
        }
        QUOTED_INCLUDE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| Self::Quoted(m.as_str()))
    }

    /// Whether this is a `../`-relative include ending in `file_name`
    pub fn is_relative_to(&self, file_name: &str) -> bool {
        match self {
            Self::Quoted(path) => path.starts_with("../") && path.ends_with(file_name),
            _ => false,
        }
    }
}
