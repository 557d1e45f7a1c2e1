//! # minicheck
//!
//! A static analyzer for MiniC, a small C-like imperative language with
//! `int` and `bool`, block scope, non-recursive functions, and
//! `if`/`while`/`return`/`print`. Given a source file it produces a
//! diagnostic report: errors and warnings with source locations.
//!
//! ## Pipeline
//!
//! ```text
//! source ─ lexer ─ parser ─▶ surface AST
//!        ─ binder ─────────▶ typed AST (symbol ids + checked types)
//!        ─ CFG builder ────▶ one graph per function
//!        ─ dataflow engine ▶ reachability · return paths · definite
//!                            assignment · liveness · zero analysis
//!        ─ sink ───────────▶ diagnostics sorted by (file, line, column)
//! ```
//!
//! The interesting part is the analysis core: a faithful control-flow
//! graph per function and a generic fixed-point solver that the four
//! lattice-based analyses instantiate with their direction, join,
//! transfer function, and (for the path-sensitive zero analysis) an
//! edge-refinement hook that specializes facts along True/False branch
//! edges.
//!
//! The whole pipeline is a pure function from source bytes to a
//! diagnostic sequence — no global state — so runs are deterministic and
//! repeatable.
//!
//! ## Example
//!
//! ```rust
//! use minicheck::pipeline::analyze_source;
//! use std::path::Path;
//!
//! let source = r#"
//!     int main() {
//!         int x = 0;
//!         return 10 / x;
//!     }
//! "#;
//! let diagnostics = analyze_source(Path::new("example.mc"), source);
//! assert_eq!(diagnostics.len(), 1);
//! assert!(diagnostics[0].message.contains("division by zero"));
//! ```
//!
//! ## CLI
//!
//! ```bash
//! minicheck analyze program.mc
//! minicheck analyze program.mc --format json --output report.json
//! ```
//!
//! Exit code 0 means no errors (warnings allowed), 1 means at least one
//! error-level diagnostic, 2 an invocation failure. Logging is controlled
//! by `RUST_LOG` (default `warn`).

pub mod analysis;
pub mod cfg;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dataflow;
pub mod diagnostics;
pub mod errors;
pub mod io;
pub mod observability;
pub mod pipeline;
pub mod semantic;
pub mod syntax;

// Re-export the types most callers need.
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity, SourceLocation};
pub use crate::errors::{Error, Result};
pub use crate::pipeline::{analyze_file, analyze_source};
