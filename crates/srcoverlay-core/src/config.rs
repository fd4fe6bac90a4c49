//! Configuration types
//!
//! Two sources of configuration feed a check run: the exclusion file that
//! lives next to the overrides, and [`CheckConfig`], which carries the naming
//! conventions of the overlay (guard prefix, header extensions, markers).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Keys that must be present in an exclusion file
pub const EXCLUSION_KEYS: [&str; 4] = [
    "RE_PATH_EXCLUDES",
    "PATH_EXCLUDES",
    "GRIT_INCLUDES",
    "SYMBOL_EXCLUDES",
];

/// Exclusion table loaded from the overlay's exclusion file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusions {
    /// Regular expressions matched against override paths
    pub re_path_excludes: Vec<String>,
    /// Override paths that are not true overrides
    pub path_excludes: Vec<String>,
    /// Override paths whose originals live in the generated tree
    pub grit_includes: Vec<String>,
    /// Per override path, symbols allowed to stay defined past the file
    pub symbol_excludes: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Deserialize)]
struct RawSection<T> {
    values: Option<T>,
}

#[derive(Deserialize)]
struct RawExclusions {
    #[serde(rename = "RE_PATH_EXCLUDES")]
    re_path_excludes: Option<RawSection<Vec<String>>>,
    #[serde(rename = "PATH_EXCLUDES")]
    path_excludes: Option<RawSection<Vec<String>>>,
    #[serde(rename = "GRIT_INCLUDES")]
    grit_includes: Option<RawSection<Vec<String>>>,
    #[serde(rename = "SYMBOL_EXCLUDES")]
    symbol_excludes: Option<RawSection<BTreeMap<String, BTreeSet<String>>>>,
}

fn take_values<T: Default>(
    key: &str,
    section: Option<RawSection<T>>,
    problems: &mut Vec<String>,
) -> T {
    match section {
        None => {
            problems.push(format!("Key '{}' is missing", key));
            T::default()
        }
        Some(RawSection { values: None }) => {
            problems.push(format!("Key 'values' is missing from '{}'", key));
            T::default()
        }
        Some(RawSection { values: Some(v) }) => v,
    }
}

impl Exclusions {
    /// Load exclusions from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse exclusions from JSON text
    ///
    /// Every missing key is collected before failing so a broken file is
    /// fixed in one go.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawExclusions = serde_json::from_str(content)?;
        let mut problems = Vec::new();

        let exclusions = Self {
            re_path_excludes: take_values(EXCLUSION_KEYS[0], raw.re_path_excludes, &mut problems),
            path_excludes: take_values(EXCLUSION_KEYS[1], raw.path_excludes, &mut problems),
            grit_includes: take_values(EXCLUSION_KEYS[2], raw.grit_includes, &mut problems),
            symbol_excludes: take_values(EXCLUSION_KEYS[3], raw.symbol_excludes, &mut problems),
        };

        if problems.is_empty() {
            Ok(exclusions)
        } else {
            Err(Error::Config(problems.join("; ")))
        }
    }

    /// Check whether `symbol` is excluded for the override at `override_path`
    pub fn is_symbol_excluded(&self, override_path: &str, symbol: &str) -> bool {
        let normalized = override_path.replace('\\', "/");
        self.symbol_excludes
            .get(&normalized)
            .map(|symbols| symbols.contains(symbol))
            .unwrap_or(false)
    }
}

/// Naming conventions used by the override checks
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Prefix of derived header guard names
    pub guard_prefix: String,

    /// Extensions (without dot) treated as headers
    pub header_extensions: Vec<String>,

    /// Prefix of internal build-flag accessor macros
    pub buildflag_marker: String,

    /// Pattern selecting overrides of generated (GRIT) files
    pub grit_pattern: String,

    /// Directory holding overrides, relative to the overlay root
    pub overrides_dir: String,

    /// Exclusion file, relative to the overlay root
    pub exclusions_file: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            guard_prefix: "BRAVE_CHROMIUM_SRC_".into(),
            header_extensions: vec!["h".into()],
            buildflag_marker: "BUILDFLAG_INTERNAL_".into(),
            grit_pattern: ".*grit.*".into(),
            overrides_dir: "chromium_src".into(),
            exclusions_file: "script/check_chromium_src.json".into(),
        }
    }
}

impl CheckConfig {
    /// Check whether a path names a header file
    pub fn is_header(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.header_extensions.iter().any(|h| h == ext))
            .unwrap_or(false)
    }
}
