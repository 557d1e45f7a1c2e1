//! Definite assignment: every variable must be assigned on all paths
//! before it is read.
//!
//! A forward must-analysis on the engine. The fact is the set of symbols
//! definitely assigned so far; join is intersection, so a variable
//! assigned in only one branch is not definitely assigned after the join.
//! Bottom is the universal set (`None` here), the identity for
//! intersection, and the entry boundary is the parameter set.
//!
//! Diagnostics come from a second walk that replays each reachable block
//! with a running fact, so precision within a block is exact: `x = 1;
//! print(x);` in one block is fine even when `x` was unassigned at the
//! block's start.

use crate::cfg::{BlockId, Cfg, StmtUnit, Terminator};
use crate::dataflow::bitset::SymbolSet;
use crate::dataflow::{self, Analysis, Direction};
use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::semantic::typed::{Expr, Function};

/// `None` is the universal set: the lattice bottom that any real fact
/// narrows on the first join.
type Fact = Option<SymbolSet>;

struct DefiniteAssignment<'f> {
    function: &'f Function,
}

impl<'a, 'f> Analysis<'a> for DefiniteAssignment<'f> {
    type Fact = Fact;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn bottom(&self, _cfg: &Cfg<'a>) -> Fact {
        None
    }

    fn boundary(&self, _cfg: &Cfg<'a>) -> Fact {
        let mut assigned = SymbolSet::empty(self.function.symbols.len());
        for &param in &self.function.params {
            assigned.insert(param);
        }
        Some(assigned)
    }

    fn join(&self, into: &mut Fact, from: &Fact) {
        match (into.as_mut(), from) {
            // Universal is the identity.
            (_, None) => {}
            (None, Some(from)) => *into = Some(from.clone()),
            (Some(into), Some(from)) => into.intersect_with(from),
        }
    }

    fn transfer(&self, cfg: &Cfg<'a>, block: BlockId, fact: &Fact) -> Fact {
        // Adding to the universal set leaves it universal.
        let mut assigned = fact.clone()?;
        for unit in &cfg.block(block).units {
            apply_unit(unit, &mut assigned);
        }
        Some(assigned)
    }
}

fn apply_unit(unit: &StmtUnit<'_>, assigned: &mut SymbolSet) {
    match unit {
        StmtUnit::Decl {
            symbol,
            init: Some(_),
            ..
        }
        | StmtUnit::Assign { symbol, .. } => assigned.insert(*symbol),
        StmtUnit::Decl { init: None, .. } | StmtUnit::Print { .. } | StmtUnit::Cond { .. } => {}
    }
}

/// Run the analysis and report every read of a not-definitely-assigned
/// variable in reachable code.
pub fn check(cfg: &Cfg<'_>, reachable: &[bool], function: &Function, sink: &mut DiagnosticSink) {
    let analysis = DefiniteAssignment { function };
    let solution = dataflow::solve(cfg, &analysis);

    for id in cfg.block_ids() {
        if !reachable[id.0] {
            continue;
        }
        let Some(mut assigned) = solution.input_of(id).clone() else {
            continue;
        };

        for unit in &cfg.block(id).units {
            match unit {
                StmtUnit::Decl {
                    symbol,
                    init: Some(init),
                    ..
                } => {
                    check_uses(init, &assigned, function, sink);
                    assigned.insert(*symbol);
                }
                StmtUnit::Decl { init: None, .. } => {}
                StmtUnit::Assign { symbol, value, .. } => {
                    check_uses(value, &assigned, function, sink);
                    assigned.insert(*symbol);
                }
                StmtUnit::Print { value, .. } | StmtUnit::Cond { value } => {
                    check_uses(value, &assigned, function, sink);
                }
            }
        }

        // Branch conditions were checked as Cond units; the return value
        // is the one expression living in a terminator.
        if let Terminator::Return {
            value: Some(value), ..
        } = &cfg.block(id).terminator
        {
            check_uses(value, &assigned, function, sink);
        }
    }
}

fn check_uses(expr: &Expr, assigned: &SymbolSet, function: &Function, sink: &mut DiagnosticSink) {
    expr.for_each_var(&mut |symbol, pos| {
        if !assigned.contains(symbol) {
            sink.report(
                DiagnosticKind::UseBeforeDef,
                pos,
                format!(
                    "variable '{}' used before assignment",
                    function.symbols.name(symbol)
                ),
            );
        }
    });
}
