//! Shared error types for the analyzer.

use crate::syntax::ast::Pos;
use std::path::PathBuf;
use thiserror::Error;

/// A fatal lexical or syntactic failure from the front-end.
///
/// The pipeline converts this into a single `SyntaxError` diagnostic;
/// analysis does not proceed past a file that cannot be parsed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FrontendError {
    pub message: String,
    pub pos: Pos,
}

impl FrontendError {
    pub fn new(message: impl Into<String>, pos: Pos) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

/// Fatal application errors: failures of the process itself, as opposed
/// to diagnostics about the analyzed program.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    WriteReport(#[from] std::io::Error),
}

impl Error {
    pub fn read_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadSource {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, Error>;
