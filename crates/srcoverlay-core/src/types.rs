//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a macro occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacroKind {
    /// `#define NAME VALUE`
    Plain,
    /// `#define NAME(args) VALUE(args...)`
    FunctionLike,
    /// `#undef NAME`
    Cancellation,
    /// Any other line mentioning the symbol as a whole word
    Reference,
}

impl MacroKind {
    /// Whether this occurrence redefines the symbol
    pub fn is_definition(&self) -> bool {
        matches!(self, MacroKind::Plain | MacroKind::FunctionLike)
    }
}

/// A macro occurrence in comment-stripped text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroMatch {
    /// Macro name
    pub symbol: String,
    /// Occurrence kind
    pub kind: MacroKind,
    /// Byte offset in the stripped text
    pub position: usize,
}

impl MacroMatch {
    /// Create a new macro match
    pub fn new(symbol: impl Into<String>, kind: MacroKind, position: usize) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            position,
        }
    }
}

/// Per-symbol result of validating a redefinition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// A defining line was found
    pub definition_found: bool,
    /// An `#undef` follows the first definition
    pub cancellation_found: bool,
    /// The symbol is referenced outside its definition and the `#undef` closing it
    pub used_elsewhere: bool,
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Counted problem in the checked tree
    Error,
    /// Informational note, never counted
    Info,
    /// Internal inconsistency of the checker itself (counted)
    ScriptError,
}

impl Severity {
    /// Label printed in front of the message
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Info => "INFO",
            Severity::ScriptError => "SCRIPT ERROR",
        }
    }

    /// Whether diagnostics of this severity count towards the error total
    pub fn is_counted(&self) -> bool {
        !matches!(self, Severity::Info)
    }
}

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    MissingDefinition,
    MissingCancellation,
    SymbolNotInOriginal,
    SymbolNotInOriginalButUsedInternally,
    NoSourceForOverride,
    UnexpectedSrcInclude,
    UnexpectedGenInclude,
    RelativeInclude,
    MissingExclusionPath,
    MissingExclusionSymbol,
}

impl DiagnosticKind {
    /// Severity implied by the kind
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::MissingDefinition => Severity::ScriptError,
            DiagnosticKind::SymbolNotInOriginalButUsedInternally => Severity::Info,
            _ => Severity::Error,
        }
    }
}

/// A human-readable finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// File the finding is about
    pub file: String,
    /// Headline
    pub message: String,
    /// Indented follow-up lines
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic without notes
    pub fn new(kind: DiagnosticKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Append a follow-up line
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.severity().label();
        write!(f, "{}: {}", label, self.message)?;
        let indent = " ".repeat(label.len() + 2);
        for note in &self.notes {
            write!(f, "\n{}{}", indent, note)?;
        }
        Ok(())
    }
}

/// Receiver of diagnostics
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
