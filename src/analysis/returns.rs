//! Return-path completeness.
//!
//! Every MiniC function returns a value, so control must never run off the
//! end of the body. Expressed over the CFG: no reachable predecessor of
//! the exit block may reach it by fall-through — the only fall-through
//! edge into exit is the one the builder adds for the body's tail.
//! Reachability here is the semantic set from
//! [`crate::analysis::reachability`], so `while (true) { return 0; }`
//! passes: its after-loop block is unreachable once the constant condition
//! prunes the False edge.

use crate::cfg::{Cfg, EXIT};
use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::semantic::typed::Function;

pub fn check(cfg: &Cfg<'_>, reachable: &[bool], function: &Function, sink: &mut DiagnosticSink) {
    let falls_through = cfg
        .predecessors(EXIT)
        .iter()
        .any(|(pred, _)| reachable[pred.0] && cfg.block(*pred).terminator.is_fall_through());

    if falls_through {
        sink.report(
            DiagnosticKind::MissingReturn,
            function.body.end,
            format!(
                "function '{}' may not return a value on all paths",
                function.name
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::reachability;
    use crate::cfg::builder;
    use crate::semantic::{bind_program, typed};
    use crate::syntax::{Lexer, Parser};

    fn bind_first(source: &str) -> typed::Function {
        let tokens = Lexer::new(source).tokenize().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let mut sink = DiagnosticSink::new("test.mc");
        let mut bound = bind_program(&program, &mut sink);
        bound.functions.remove(0)
    }

    fn missing_return(source: &str) -> bool {
        let function = bind_first(source);
        let cfg = builder::build(&function);
        let reachable = reachability::reachable_blocks(&cfg);
        let mut sink = DiagnosticSink::new("test.mc");
        check(&cfg, &reachable, &function, &mut sink);
        !sink.is_empty()
    }

    #[test]
    fn test_plain_return() {
        assert!(!missing_return("int main() { return 0; }"));
    }

    #[test]
    fn test_empty_body() {
        assert!(missing_return("int main() { }"));
    }

    #[test]
    fn test_only_one_branch_returns() {
        assert!(missing_return("int f(int a) { if (a > 0) { return 1; } }"));
    }

    #[test]
    fn test_both_branches_return() {
        assert!(!missing_return(
            "int f(int a) { if (a > 0) { return 1; } else { return 2; } }"
        ));
    }

    #[test]
    fn test_branch_then_tail_return() {
        assert!(!missing_return(
            "int f(int a) { if (a > 0) { return 1; } return 2; }"
        ));
    }

    #[test]
    fn test_while_true_with_return_body() {
        assert!(!missing_return("int main() { while (true) { return 0; } }"));
    }

    #[test]
    fn test_loop_with_unknown_condition_may_skip_body() {
        assert!(missing_return(
            "int f(int a) { while (a > 0) { return 1; } }"
        ));
    }

    #[test]
    fn test_diagnostic_points_at_closing_brace() {
        let function = bind_first("int f(int a) {\n  if (a > 0) { return 1; }\n}");
        let cfg = builder::build(&function);
        let reachable = reachability::reachable_blocks(&cfg);
        let mut sink = DiagnosticSink::new("test.mc");
        check(&cfg, &reachable, &function, &mut sink);
        let out = sink.finish();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].location.line, 3);
        assert_eq!(out[0].location.column, 1);
        assert!(out[0]
            .message
            .contains("may not return a value on all paths"));
    }
}
