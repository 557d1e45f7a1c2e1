//! Live variables and dead-store detection.
//!
//! A backward may-analysis on the engine: a variable is live at a point if
//! some path from there reads it before overwriting it. Join is union and
//! the boundary at exit is empty — nothing is live once the function
//! returns, so parameters are treated exactly like locals.
//!
//! A store to a variable that is not live immediately afterwards is a dead
//! store. `print` and `return` count as reads of their operand variables.

use crate::cfg::{BlockId, Cfg, StmtUnit, Terminator};
use crate::dataflow::bitset::SymbolSet;
use crate::dataflow::{self, Analysis, Direction};
use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::semantic::symbols::SymbolId;
use crate::semantic::typed::{Expr, Function};
use crate::syntax::ast::Pos;

struct Liveness {
    universe: usize,
}

impl<'a> Analysis<'a> for Liveness {
    type Fact = SymbolSet;

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn bottom(&self, _cfg: &Cfg<'a>) -> SymbolSet {
        SymbolSet::empty(self.universe)
    }

    fn boundary(&self, _cfg: &Cfg<'a>) -> SymbolSet {
        SymbolSet::empty(self.universe)
    }

    fn join(&self, into: &mut SymbolSet, from: &SymbolSet) {
        into.union_with(from);
    }

    /// From live-out at the block's end to live-in at its start.
    fn transfer(&self, cfg: &Cfg<'a>, block: BlockId, fact: &SymbolSet) -> SymbolSet {
        let mut live = fact.clone();
        apply_terminator(&cfg.block(block).terminator, &mut live);
        for unit in cfg.block(block).units.iter().rev() {
            apply_unit(unit, &mut live);
        }
        live
    }
}

fn apply_terminator(terminator: &Terminator<'_>, live: &mut SymbolSet) {
    if let Terminator::Return {
        value: Some(value), ..
    } = terminator
    {
        gen_uses(value, live);
    }
    // Branch conditions are Cond units; Goto and Exit read nothing.
}

fn apply_unit(unit: &StmtUnit<'_>, live: &mut SymbolSet) {
    match unit {
        StmtUnit::Decl {
            symbol,
            init: Some(init),
            ..
        } => {
            live.remove(*symbol);
            gen_uses(init, live);
        }
        StmtUnit::Decl {
            symbol, init: None, ..
        } => {
            live.remove(*symbol);
        }
        StmtUnit::Assign { symbol, value, .. } => {
            live.remove(*symbol);
            gen_uses(value, live);
        }
        StmtUnit::Print { value, .. } | StmtUnit::Cond { value } => gen_uses(value, live),
    }
}

fn gen_uses(expr: &Expr, live: &mut SymbolSet) {
    expr.for_each_var(&mut |symbol, _| live.insert(symbol));
}

/// Run the analysis and report every dead store in reachable code.
pub fn check(cfg: &Cfg<'_>, reachable: &[bool], function: &Function, sink: &mut DiagnosticSink) {
    let analysis = Liveness {
        universe: function.symbols.len(),
    };
    let solution = dataflow::solve(cfg, &analysis);

    for id in cfg.block_ids() {
        if !reachable[id.0] {
            continue;
        }
        // Replay the block backwards from its live-out fact; a store is
        // dead exactly when its target is not live at the store.
        let mut live = solution.input_of(id).clone();
        apply_terminator(&cfg.block(id).terminator, &mut live);

        for unit in cfg.block(id).units.iter().rev() {
            match unit {
                StmtUnit::Decl {
                    pos,
                    symbol,
                    init: Some(init),
                } => {
                    report_if_dead(*symbol, *pos, &live, function, sink);
                    live.remove(*symbol);
                    gen_uses(init, &mut live);
                }
                StmtUnit::Decl {
                    symbol, init: None, ..
                } => {
                    live.remove(*symbol);
                }
                StmtUnit::Assign { pos, symbol, value } => {
                    report_if_dead(*symbol, *pos, &live, function, sink);
                    live.remove(*symbol);
                    gen_uses(value, &mut live);
                }
                StmtUnit::Print { value, .. } | StmtUnit::Cond { value } => {
                    gen_uses(value, &mut live);
                }
            }
        }
    }
}

fn report_if_dead(
    symbol: SymbolId,
    pos: Pos,
    live: &SymbolSet,
    function: &Function,
    sink: &mut DiagnosticSink,
) {
    if !live.contains(symbol) {
        sink.report(
            DiagnosticKind::DeadStore,
            pos,
            format!(
                "value assigned to '{}' is never read",
                function.symbols.name(symbol)
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
        assert!(!sink.has_errors(), "front-end errors in test source");
        bound.functions.remove(0)
    }

    fn messages(source: &str) -> Vec<String> {
        let function = bind_first(source);
        let cfg = builder::build(&function);
        let reachable = reachability::reachable_blocks(&cfg);
        let mut sink = DiagnosticSink::new("test.mc");
        check(&cfg, &reachable, &function, &mut sink);
        sink.finish().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_overwritten_before_read() {
        let msgs = messages("int main() { int x = 10; x = 20; print(x); return 0; }");
        assert_eq!(msgs, vec!["value assigned to 'x' is never read"]);
    }

    #[test]
    fn test_dead_store_location_is_the_first_store() {
        let function = bind_first("int main() { int x = 10; x = 20; print(x); return 0; }");
        let cfg = builder::build(&function);
        let reachable = reachability::reachable_blocks(&cfg);
        let mut sink = DiagnosticSink::new("test.mc");
        check(&cfg, &reachable, &function, &mut sink);
        let out = sink.finish();
        assert_eq!(out[0].location.column, 14); // at `int x = 10;`
    }

    #[test]
    fn test_store_read_by_print_is_live() {
        assert!(messages("int main() { int x = 10; print(x); x = 20; print(x); return 0; }")
            .is_empty());
    }

    #[test]
    fn test_store_read_by_return_is_live() {
        assert!(messages("int main() { int x = 10; return x; }").is_empty());
    }

    #[test]
    fn test_store_never_read_before_exit() {
        let msgs = messages("int main() { int x = 5; return 0; }");
        assert_eq!(msgs, vec!["value assigned to 'x' is never read"]);
    }

    #[test]
    fn test_parameter_store_is_symmetric_to_locals() {
        let msgs = messages("int f(int a) { a = 1; return 0; }");
        assert_eq!(msgs, vec!["value assigned to 'a' is never read"]);
    }

    #[test]
    fn test_store_read_in_one_branch_is_live() {
        assert!(messages(
            "int f(int c) { int x = 1; if (c > 0) { print(x); } return 0; }"
        )
        .is_empty());
    }

    #[test]
    fn test_store_read_by_loop_condition_is_live() {
        assert!(messages(
            "int main() { int i = 0; while (i < 3) { i = i + 1; } return i; }"
        )
        .is_empty());
    }

    #[test]
    fn test_loop_carried_store_is_live() {
        // The store in the body feeds the next iteration's condition.
        assert!(messages(
            "int main() { int i = 0; while (i < 3) { i = i + 1; } return 0; }"
        )
        .is_empty());
    }

    #[test]
    fn test_unreachable_store_is_not_reported() {
        assert!(messages("int main() { return 0; int x = 5; return 0; }").is_empty());
    }
}
