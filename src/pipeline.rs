//! The analysis pipeline: source bytes in, sorted diagnostics out.
//!
//! [`analyze_source`] is a pure function — no global state, no I/O — so
//! running it twice on the same input yields byte-identical diagnostic
//! sequences. [`analyze_file`] is the thin imperative wrapper that reads
//! the file.

use crate::analysis;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::errors::{Error, Result};
use crate::semantic::bind_program;
use crate::syntax::{Lexer, Parser};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Analyze one MiniC source text, returning diagnostics in stable
/// emission order.
pub fn analyze_source(file: &Path, source: &str) -> Vec<Diagnostic> {
    let mut sink = DiagnosticSink::new(file);

    // A file that cannot be tokenized or parsed gets exactly one syntax
    // diagnostic; there is no tree to analyze past that point.
    let tokens = match Lexer::new(source).tokenize() {
        Ok(tokens) => tokens,
        Err(err) => {
            sink.report(DiagnosticKind::SyntaxError, err.pos, err.message);
            return sink.finish();
        }
    };
    debug!(tokens = tokens.len(), "lexed source");

    let program = match Parser::new(tokens).parse() {
        Ok(program) => program,
        Err(err) => {
            sink.report(DiagnosticKind::SyntaxError, err.pos, err.message);
            return sink.finish();
        }
    };
    debug!(functions = program.functions.len(), "parsed program");

    // Front-end defects do not stop the core analyses; one run reports
    // everything it can.
    let bound = bind_program(&program, &mut sink);
    for function in &bound.functions {
        analysis::analyze_function(function, &mut sink);
    }

    info!(
        file = %file.display(),
        diagnostics = sink.len(),
        "analysis finished"
    );
    sink.finish()
}

/// Read and analyze a source file.
pub fn analyze_file(path: &Path) -> Result<Vec<Diagnostic>> {
    let source =
        fs::read_to_string(path).map_err(|source| Error::read_source(path, source))?;
    Ok(analyze_source(path, &source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticKind, Severity};
    use std::path::PathBuf;

    fn analyze(source: &str) -> Vec<Diagnostic> {
        analyze_source(&PathBuf::from("test.mc"), source)
    }

    fn kinds(source: &str) -> Vec<DiagnosticKind> {
        analyze(source).into_iter().map(|d| d.kind).collect()
    }

    // The scenarios below are end-to-end contracts: each source produces
    // exactly the listed diagnostics.

    #[test]
    fn test_scenario_branch_assignment_does_not_survive_join() {
        let out = analyze("int main() { int x; if (1==1) { x = 1; } print(x); return 0; }");
        assert_eq!(
            out.iter().map(|d| d.kind).collect::<Vec<_>>(),
            vec![DiagnosticKind::UseBeforeDef]
        );
        assert!(out[0].message.contains("'x'"));
    }

    #[test]
    fn test_scenario_code_after_return() {
        let out = analyze("int main() { return 0; int x = 5; return x; }");
        assert_eq!(
            out.iter().map(|d| d.kind).collect::<Vec<_>>(),
            vec![DiagnosticKind::Unreachable]
        );
        assert_eq!(out[0].location.column, 24); // at `int x = 5;`
    }

    #[test]
    fn test_scenario_overwritten_store() {
        let out = analyze("int main() { int x = 10; x = 20; print(x); return 0; }");
        assert_eq!(
            out.iter().map(|d| d.kind).collect::<Vec<_>>(),
            vec![DiagnosticKind::DeadStore]
        );
        assert_eq!(out[0].location.column, 14); // at `int x = 10;`
    }

    #[test]
    fn test_scenario_division_stays_intraprocedural() {
        // The call-site zero is not propagated into div; parameter b is
        // merely unknown there.
        let out =
            analyze("int div(int a, int b) { return a / b; } int main() { return div(1, 0); }");
        assert_eq!(
            out.iter().map(|d| d.kind).collect::<Vec<_>>(),
            vec![DiagnosticKind::PossibleDivisionByZero]
        );
        assert_eq!(out[0].location.line, 1);
    }

    #[test]
    fn test_scenario_division_by_proven_zero() {
        let out = analyze("int main() { int x = 0; return 10 / x; }");
        assert_eq!(
            out.iter().map(|d| d.kind).collect::<Vec<_>>(),
            vec![DiagnosticKind::DivisionByZero]
        );
    }

    #[test]
    fn test_scenario_refined_branch_has_no_division_diagnostic() {
        let out = analyze("int main() { int x = 5; if (x) { return 10 / x; } return 0; }");
        assert!(out.is_empty(), "unexpected: {out:?}");
    }

    #[test]
    fn test_scenario_missing_return_on_some_path() {
        let out = analyze("int f(int a) { if (a > 0) { return 1; } }");
        assert_eq!(
            out.iter().map(|d| d.kind).collect::<Vec<_>>(),
            vec![DiagnosticKind::MissingReturn]
        );
    }

    // Boundary cases from the testable-properties contract.

    #[test]
    fn test_empty_body_is_missing_return() {
        assert_eq!(kinds("int main() { }"), vec![DiagnosticKind::MissingReturn]);
    }

    #[test]
    fn test_int_max_boundary() {
        assert!(kinds("int main() { int x = 2147483647; return x; }").is_empty());
        assert_eq!(
            kinds("int main() { int x = 2147483648; return x; }"),
            vec![DiagnosticKind::ConstantOverflow]
        );
    }

    #[test]
    fn test_while_true_return_body_is_clean() {
        assert!(kinds("int main() { while (true) { return 0; } }").is_empty());
    }

    #[test]
    fn test_syntax_error_is_a_single_error_diagnostic() {
        let out = analyze("int main() { int x = ; return 0; }");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiagnosticKind::SyntaxError);
        assert_eq!(out[0].severity, Severity::Error);
    }

    #[test]
    fn test_lexer_error_is_a_single_error_diagnostic() {
        let out = analyze("int main() { int x = 1 @ 2; return x; }");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiagnosticKind::SyntaxError);
        assert!(out[0].message.contains("unexpected character"));
    }

    #[test]
    fn test_front_end_errors_do_not_stop_core_analyses() {
        // An undeclared variable and a missing return in the same run.
        let out = analyze("int main() { y = 1; }");
        let kinds: Vec<_> = out.iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&DiagnosticKind::UndeclaredVariable));
        assert!(kinds.contains(&DiagnosticKind::MissingReturn));
    }

    #[test]
    fn test_diagnostics_are_sorted_by_position() {
        let out = analyze(
            "int main() {\n  int a = 1;\n  int b;\n  print(b);\n  a = 2;\n  print(a);\n  return 0;\n}",
        );
        let lines: Vec<_> = out.iter().map(|d| d.location.line).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let source = "int f(int a) { int x = 0; while (a > 0) { x = x + a; a = a - 1; } return 10 / x; }\n\
                      int main() { return f(3); }";
        assert_eq!(analyze(source), analyze(source));
    }

    #[test]
    fn test_multiple_functions_each_analyzed() {
        let out = analyze(
            "int f() { int dead = 1; return 0; }\n\
             int g() { if (1 == 2) { print(9); } return 0; }\n\
             int main() { return f() + g(); }",
        );
        let kinds: Vec<_> = out.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::DeadStore, DiagnosticKind::Unreachable]
        );
    }
}
