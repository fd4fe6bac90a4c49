//! Feature table loading
//!
//! [`FeatureCompiler`] merges the top-level entries of every feature file
//! into one table, then hands the table to each registered
//! [`FeatureMutator`] in registration order.

use crate::jsonc::parse_jsonc;
use serde_json::{Map, Value};
use srcoverlay_core::{Error, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Feature name to definition (an object or a list of objects)
pub type FeatureTable = Map<String, Value>;

/// Hook run after the feature files are loaded
pub trait FeatureMutator: Send + Sync {
    /// Mutate the loaded table
    ///
    /// `source_files` are the paths the table was loaded from, as given to
    /// the compiler.
    fn apply(&self, source_files: &[String], table: &mut FeatureTable) -> Result<()>;

    /// Get mutator name
    fn name(&self) -> &str;
}

/// Feature-definition loader
pub struct FeatureCompiler {
    /// Directory the source file paths are relative to
    base_dir: PathBuf,
    source_files: Vec<String>,
    table: FeatureTable,
    mutators: Vec<Box<dyn FeatureMutator>>,
}

impl FeatureCompiler {
    /// Create a compiler for `source_files` relative to `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>, source_files: Vec<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            source_files,
            table: FeatureTable::new(),
            mutators: Vec::new(),
        }
    }

    /// Register a mutator; mutators run in registration order
    pub fn register(&mut self, mutator: Box<dyn FeatureMutator>) {
        self.mutators.push(mutator);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_mutator(mut self, mutator: Box<dyn FeatureMutator>) -> Self {
        self.register(mutator);
        self
    }

    pub fn source_files(&self) -> &[String] {
        &self.source_files
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    /// Consume the compiler, returning the table
    pub fn into_table(self) -> FeatureTable {
        self.table
    }

    /// Load every source file, then run the mutators
    pub fn load(&mut self) -> Result<()> {
        for source_file in &self.source_files {
            let path = self.base_dir.join(source_file);
            let content = std::fs::read_to_string(&path)
                .map_err(|e| Error::Feature(format!("Failed to read {}: {}", path.display(), e)))?;
            merge_into(&mut self.table, source_file, parse_jsonc(&content)?)?;
        }
        info!(
            "Loaded {} features from {} files",
            self.table.len(),
            self.source_files.len()
        );

        for mutator in &self.mutators {
            debug!("Applying feature mutator {}", mutator.name());
            mutator.apply(&self.source_files, &mut self.table)?;
        }
        Ok(())
    }
}

/// Merge the entries of one file into the table, rejecting duplicates
fn merge_into(table: &mut FeatureTable, source_file: &str, parsed: Value) -> Result<()> {
    let Value::Object(entries) = parsed else {
        return Err(Error::Feature(format!(
            "{} does not contain a JSON object",
            source_file
        )));
    };

    let mut duplicates: Vec<&str> = entries
        .keys()
        .filter(|key| table.contains_key(*key))
        .map(String::as_str)
        .collect();
    if !duplicates.is_empty() {
        duplicates.sort_unstable();
        return Err(Error::Feature(format!(
            "Duplicate keys found in {}: {}",
            source_file,
            duplicates.join(", ")
        )));
    }

    table.extend(entries);
    Ok(())
}
