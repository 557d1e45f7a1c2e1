//! Path-sensitive zero/non-zero analysis and division diagnostics.
//!
//! A forward analysis over a three-valued domain per integer variable:
//! `Zero`, `NonZero`, or `Unknown`, with `Zero ⊔ NonZero = Unknown` and
//! unassigned or non-integer variables simply absent. The whole fact is
//! `Option`-wrapped: `None` is the unreached bottom, the identity for
//! join, which is what keeps infeasible edges (the True edge of
//! `if (false)`) from polluting a successor's IN.
//!
//! Path sensitivity comes from the engine's edge hook: a conditional
//! block's OUT is refined per labeled edge using the branch condition, so
//! `if (x) { ... }` knows `x` is non-zero in the then-branch and zero in
//! the else-branch. The domain has height 2 per variable, so loops
//! converge.
//!
//! Division sites consult the running fact at their statement: a divisor
//! proven zero is an error, a possibly-zero divisor a warning, a proven
//! non-zero divisor silent.

use crate::analysis::const_fold::{self, Value};
use crate::cfg::{BlockId, Cfg, EdgeLabel, StmtUnit, Terminator};
use crate::dataflow::{self, Analysis, Direction};
use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::semantic::symbols::{SymbolId, Ty};
use crate::semantic::typed::{Expr, ExprKind, Function};
use crate::syntax::ast::{BinaryOp, UnaryOp};
use im::OrdMap;

/// Abstract value of one integer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zeroness {
    Zero,
    NonZero,
    Unknown,
}

impl Zeroness {
    /// Lattice join: equal values stay, disagreement widens to Unknown.
    fn join(self, other: Zeroness) -> Zeroness {
        if self == other {
            self
        } else {
            Zeroness::Unknown
        }
    }
}

/// Per-variable abstract values; absent means unassigned or not an int.
type ZeroMap = OrdMap<SymbolId, Zeroness>;

/// `None` is the unreached bottom.
type Fact = Option<ZeroMap>;

struct ZeroAnalysis<'f> {
    function: &'f Function,
}

impl<'a, 'f> Analysis<'a> for ZeroAnalysis<'f> {
    type Fact = Fact;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn bottom(&self, _cfg: &Cfg<'a>) -> Fact {
        None
    }

    fn boundary(&self, _cfg: &Cfg<'a>) -> Fact {
        // Parameters arrive assigned but unconstrained.
        let mut map = ZeroMap::new();
        for &param in &self.function.params {
            if self.function.symbols.get(param).ty == Ty::Int {
                map.insert(param, Zeroness::Unknown);
            }
        }
        Some(map)
    }

    fn join(&self, into: &mut Fact, from: &Fact) {
        let Some(from) = from else {
            return;
        };
        match into.take() {
            None => *into = Some(from.clone()),
            Some(current) => {
                *into = Some(current.union_with(from.clone(), Zeroness::join));
            }
        }
    }

    fn transfer(&self, cfg: &Cfg<'a>, block: BlockId, fact: &Fact) -> Fact {
        let mut map = fact.clone()?;
        for unit in &cfg.block(block).units {
            apply_unit(unit, &mut map, self.function);
        }
        Some(map)
    }

    fn refine_edge(
        &self,
        cfg: &Cfg<'a>,
        source: BlockId,
        label: Option<EdgeLabel>,
        fact: Fact,
    ) -> Fact {
        let Some(label) = label else {
            return fact;
        };
        let map = fact?;
        let Terminator::Branch { condition, .. } = &cfg.block(source).terminator else {
            return Some(map);
        };

        let assume = label == EdgeLabel::True;

        // A constant condition makes the contrary edge infeasible; bottom
        // is the join identity, so the dead edge contributes nothing.
        if let Some(value) = const_fold::fold(condition) {
            if value.truthy() != assume {
                return None;
            }
        }

        let mut map = map;
        refine_condition(condition, assume, &mut map);
        Some(map)
    }
}

fn apply_unit(unit: &StmtUnit<'_>, map: &mut ZeroMap, function: &Function) {
    match unit {
        StmtUnit::Decl {
            symbol,
            init: Some(init),
            ..
        }
        | StmtUnit::Assign {
            symbol,
            value: init,
            ..
        } => {
            if function.symbols.get(*symbol).ty == Ty::Int {
                let value = eval(init, map);
                map.insert(*symbol, value);
            }
        }
        // A plain declaration leaves the variable unassigned again.
        StmtUnit::Decl {
            symbol, init: None, ..
        } => {
            map.remove(symbol);
        }
        StmtUnit::Print { .. } | StmtUnit::Cond { .. } => {}
    }
}

/// Abstract evaluation of an integer expression under `map`.
fn eval(expr: &Expr, map: &ZeroMap) -> Zeroness {
    if let Some(Value::Int(k)) = const_fold::fold(expr) {
        return if k == 0 { Zeroness::Zero } else { Zeroness::NonZero };
    }

    match &expr.kind {
        ExprKind::IntLit(v) => {
            // Out-of-range literals do not fold; any non-zero i64 stays
            // non-zero as a 32-bit truncation would still be reported by
            // the overflow pass.
            if *v == 0 {
                Zeroness::Zero
            } else {
                Zeroness::NonZero
            }
        }
        ExprKind::Var(symbol) => map.get(symbol).copied().unwrap_or(Zeroness::Unknown),
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => eval(operand, map),
        ExprKind::Binary { op, left, right } => {
            let l = eval(left, map);
            let r = eval(right, map);
            match op {
                // A product is zero iff a factor is zero.
                BinaryOp::Mul => match (l, r) {
                    (Zeroness::Zero, _) | (_, Zeroness::Zero) => Zeroness::Zero,
                    (Zeroness::NonZero, Zeroness::NonZero) => Zeroness::NonZero,
                    _ => Zeroness::Unknown,
                },
                BinaryOp::Div => match (l, r) {
                    (Zeroness::Zero, Zeroness::NonZero) => Zeroness::Zero,
                    _ => Zeroness::Unknown,
                },
                BinaryOp::Add | BinaryOp::Sub => match (l, r) {
                    (Zeroness::Zero, other) | (other, Zeroness::Zero) => other,
                    _ => Zeroness::Unknown,
                },
                _ => Zeroness::Unknown,
            }
        }
        ExprKind::BoolLit(_)
        | ExprKind::Unary {
            op: UnaryOp::Not, ..
        }
        | ExprKind::Call { .. } => Zeroness::Unknown,
    }
}

/// Refine `map` under the assumption that `condition` evaluated to
/// `assume`. Only conditions over integer variables say anything.
fn refine_condition(condition: &Expr, assume: bool, map: &mut ZeroMap) {
    match &condition.kind {
        // if (x): truthiness of an int variable
        ExprKind::Var(symbol) if condition.ty == Ty::Int => {
            map.insert(
                *symbol,
                if assume { Zeroness::NonZero } else { Zeroness::Zero },
            );
        }

        // if (!c): flip the assumption
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => refine_condition(operand, !assume, map),

        ExprKind::Binary { op, left, right } => match op {
            BinaryOp::Eq => refine_equality(left, right, assume, map),
            BinaryOp::Ne => refine_equality(left, right, !assume, map),

            // Short-circuit: only the operands that are known to have
            // evaluated to the deciding value refine the edge.
            BinaryOp::And if assume => {
                refine_condition(left, true, map);
                refine_condition(right, true, map);
            }
            BinaryOp::Or if !assume => {
                refine_condition(left, false, map);
                refine_condition(right, false, map);
            }
            _ => {}
        },

        _ => {}
    }
}

/// Refinement for `var == constant` (either operand order), under the
/// assumption that the equality `holds`.
fn refine_equality(left: &Expr, right: &Expr, holds: bool, map: &mut ZeroMap) {
    let (symbol, constant) = match (&left.kind, &right.kind) {
        (ExprKind::Var(symbol), _) if left.ty == Ty::Int => {
            match const_fold::fold(right) {
                Some(Value::Int(k)) => (*symbol, k),
                _ => return,
            }
        }
        (_, ExprKind::Var(symbol)) if right.ty == Ty::Int => {
            match const_fold::fold(left) {
                Some(Value::Int(k)) => (*symbol, k),
                _ => return,
            }
        }
        _ => return,
    };

    if holds {
        map.insert(
            symbol,
            if constant == 0 {
                Zeroness::Zero
            } else {
                Zeroness::NonZero
            },
        );
    } else if constant == 0 {
        // x != 0 proves non-zero; x != k for non-zero k proves nothing.
        map.insert(symbol, Zeroness::NonZero);
    }
}

/// Run the analysis and report division defects in reachable code.
pub fn check(cfg: &Cfg<'_>, reachable: &[bool], function: &Function, sink: &mut DiagnosticSink) {
    let analysis = ZeroAnalysis { function };
    let solution = dataflow::solve(cfg, &analysis);

    for id in cfg.block_ids() {
        if !reachable[id.0] {
            continue;
        }
        let Some(mut map) = solution.input_of(id).clone() else {
            continue;
        };

        for unit in &cfg.block(id).units {
            match unit {
                StmtUnit::Decl {
                    init: Some(value), ..
                }
                | StmtUnit::Assign { value, .. }
                | StmtUnit::Print { value, .. }
                | StmtUnit::Cond { value } => check_divisions(value, &map, sink),
                StmtUnit::Decl { init: None, .. } => {}
            }
            apply_unit(unit, &mut map, function);
        }

        if let Terminator::Return {
            value: Some(value), ..
        } = &cfg.block(id).terminator
        {
            check_divisions(value, &map, sink);
        }
    }
}

fn check_divisions(expr: &Expr, map: &ZeroMap, sink: &mut DiagnosticSink) {
    expr.walk(&mut |node| {
        if let ExprKind::Binary {
            op: BinaryOp::Div,
            right,
            ..
        } = &node.kind
        {
            match eval(right, map) {
                Zeroness::Zero => sink.report(
                    DiagnosticKind::DivisionByZero,
                    node.pos,
                    "division by zero: divisor is always zero here",
                ),
                Zeroness::Unknown => sink.report(
                    DiagnosticKind::PossibleDivisionByZero,
                    node.pos,
                    "possible division by zero: divisor may be zero",
                ),
                Zeroness::NonZero => {}
            }
        }
    });
}
