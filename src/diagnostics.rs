//! Diagnostic records and the sink that accumulates them.
//!
//! Analyses never abort on a defect: they push records into a
//! [`DiagnosticSink`] owned by the pipeline invocation and keep going, so a
//! single run reports every defect it can find. Before emission the sink
//! sorts records by `(file, line, column, kind)` so output is stable across
//! runs and across worklist orderings.

use crate::syntax::ast::Pos;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Severity levels for diagnostics. Only errors affect the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The closed set of diagnostic kinds the analyzer emits.
///
/// The derived ordering (declaration order) is the tie-breaker in the
/// stable output sort, so front-end kinds sort before analysis kinds at
/// the same source position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DiagnosticKind {
    // Front-end kinds
    SyntaxError,
    Redeclaration,
    UndeclaredVariable,
    UndefinedFunction,
    NotAFunction,
    TypeMismatch,
    InvalidMain,

    // Core analysis kinds
    Unreachable,
    MissingReturn,
    UseBeforeDef,
    DeadStore,
    DivisionByZero,
    PossibleDivisionByZero,
    ConstantOverflow,
}

impl DiagnosticKind {
    /// The fixed severity of this kind.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::SyntaxError
            | DiagnosticKind::Redeclaration
            | DiagnosticKind::UndeclaredVariable
            | DiagnosticKind::UndefinedFunction
            | DiagnosticKind::NotAFunction
            | DiagnosticKind::TypeMismatch
            | DiagnosticKind::InvalidMain
            | DiagnosticKind::MissingReturn
            | DiagnosticKind::UseBeforeDef
            | DiagnosticKind::DivisionByZero => Severity::Error,
            DiagnosticKind::Unreachable
            | DiagnosticKind::DeadStore
            | DiagnosticKind::PossibleDivisionByZero
            | DiagnosticKind::ConstantOverflow => Severity::Warning,
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiagnosticKind::SyntaxError => "syntax-error",
            DiagnosticKind::Redeclaration => "redeclaration",
            DiagnosticKind::UndeclaredVariable => "undeclared-variable",
            DiagnosticKind::UndefinedFunction => "undefined-function",
            DiagnosticKind::NotAFunction => "not-a-function",
            DiagnosticKind::TypeMismatch => "type-mismatch",
            DiagnosticKind::InvalidMain => "invalid-main",
            DiagnosticKind::Unreachable => "unreachable",
            DiagnosticKind::MissingReturn => "missing-return",
            DiagnosticKind::UseBeforeDef => "use-before-def",
            DiagnosticKind::DeadStore => "dead-store",
            DiagnosticKind::DivisionByZero => "division-by-zero",
            DiagnosticKind::PossibleDivisionByZero => "possible-division-by-zero",
            DiagnosticKind::ConstantOverflow => "constant-overflow",
        };
        write!(f, "{name}")
    }
}

/// Location in source code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

/// A single diagnostic record: the stable shape emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
            location,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {} [{}]",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.message,
            self.kind,
        )
    }
}

/// Accumulates diagnostics for one analyzed file.
///
/// Owned by the pipeline invocation; analyses only ever append. There is no
/// global state, so concurrent pipeline runs cannot interfere.
#[derive(Debug)]
pub struct DiagnosticSink {
    file: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Record a diagnostic at a source position of the sink's file.
    pub fn report(&mut self, kind: DiagnosticKind, pos: Pos, message: impl Into<String>) {
        let location = SourceLocation::new(self.file.clone(), pos.line, pos.column);
        self.diagnostics.push(Diagnostic::new(kind, message, location));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Consume the sink, returning diagnostics in stable emission order.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by(|a, b| {
            (&a.location.file, a.location.line, a.location.column, a.kind).cmp(&(
                &b.location.file,
                b.location.line,
                b.location.column,
                b.kind,
            ))
        });
        self.diagnostics
    }
}

/// Count errors in an emitted diagnostic sequence.
pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

/// Count warnings in an emitted diagnostic sequence.
pub fn warning_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count()
}
