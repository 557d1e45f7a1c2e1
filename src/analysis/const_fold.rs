//! Constant expression folding.
//!
//! A small recursive evaluator over literals and the language operators,
//! used by the reachability pass to prune constant branches and by the
//! zero analysis to classify divisors. Arithmetic is 32-bit signed;
//! `&&`/`||` short-circuit, so an operand that is never evaluated cannot
//! decide the fold. An overflowing operation leaves the expression
//! unfolded.
//!
//! Overflow warnings come from [`report_overflows`], a separate walk over
//! every expression of a function, so each offending literal or operation
//! is reported exactly once no matter how many analyses fold it.

use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::semantic::typed::{Expr, ExprKind, Function};
use crate::syntax::ast::{BinaryOp, UnaryOp};

/// A folded compile-time constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Bool(bool),
}

impl Value {
    /// C truthiness: any non-zero int and `true` are truthy.
    pub fn truthy(self) -> bool {
        match self {
            Value::Int(k) => k != 0,
            Value::Bool(b) => b,
        }
    }
}

/// Fold `expr` to a constant if its value is decided at compile time.
///
/// Returns `None` for anything involving variables or calls, and for
/// folds that overflow 32-bit arithmetic.
pub fn fold(expr: &Expr) -> Option<Value> {
    match &expr.kind {
        ExprKind::IntLit(v) => int_in_range(*v),
        ExprKind::BoolLit(b) => Some(Value::Bool(*b)),
        ExprKind::Var(_) | ExprKind::Call { .. } => None,

        ExprKind::Unary { op, operand } => match op {
            UnaryOp::Neg => {
                // A minus applied directly to a literal folds as one unit,
                // so `-2147483648` is in range while the bare literal is not.
                if let ExprKind::IntLit(v) = operand.kind {
                    return int_in_range(-v);
                }
                match fold(operand)? {
                    Value::Int(k) => k.checked_neg().map(Value::Int),
                    Value::Bool(_) => None,
                }
            }
            UnaryOp::Not => Some(Value::Bool(!fold(operand)?.truthy())),
        },

        ExprKind::Binary { op, left, right } => fold_binary(*op, left, right),
    }
}

fn fold_binary(op: BinaryOp, left: &Expr, right: &Expr) -> Option<Value> {
    // Short-circuit operators are decided by the left operand alone.
    if op == BinaryOp::And {
        let l = fold(left)?;
        if !l.truthy() {
            return Some(Value::Bool(false));
        }
        return Some(Value::Bool(fold(right)?.truthy()));
    }
    if op == BinaryOp::Or {
        let l = fold(left)?;
        if l.truthy() {
            return Some(Value::Bool(true));
        }
        return Some(Value::Bool(fold(right)?.truthy()));
    }

    let l = fold(left)?;
    let r = fold(right)?;

    if op.is_arithmetic() {
        let (Value::Int(a), Value::Int(b)) = (l, r) else {
            return None;
        };
        let result = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            // Division by a constant zero is the zero analysis's finding,
            // not a fold; i32::MIN / -1 is the one overflowing division.
            BinaryOp::Div => {
                if b == 0 {
                    return None;
                }
                a.checked_div(b)
            }
            _ => unreachable!("arithmetic op handled above"),
        };
        return result.map(Value::Int);
    }

    if op.is_relational() {
        let (Value::Int(a), Value::Int(b)) = (l, r) else {
            return None;
        };
        let result = match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Gt => a > b,
            BinaryOp::Le => a <= b,
            BinaryOp::Ge => a >= b,
            _ => unreachable!("relational op handled above"),
        };
        return Some(Value::Bool(result));
    }

    debug_assert!(op.is_equality());
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(Value::Bool(if op == BinaryOp::Eq {
            a == b
        } else {
            a != b
        })),
        (Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(if op == BinaryOp::Eq {
            a == b
        } else {
            a != b
        })),
        _ => None,
    }
}

fn int_in_range(v: i64) -> Option<Value> {
    i32::try_from(v).ok().map(Value::Int)
}

/// Walk every expression of `function` and report each constant-folded
/// overflow once: out-of-range integer literals and arithmetic on folded
/// constants whose 32-bit result overflows.
///
/// This walks the typed AST rather than the CFG, so overflows are reported
/// even in unreachable code.
pub fn report_overflows(function: &Function, sink: &mut DiagnosticSink) {
    function
        .body
        .for_each_expr(&mut |expr| check_overflow(expr, sink));
}

fn check_overflow(expr: &Expr, sink: &mut DiagnosticSink) {
    match &expr.kind {
        ExprKind::IntLit(v) => {
            if int_in_range(*v).is_none() {
                sink.report(
                    DiagnosticKind::ConstantOverflow,
                    expr.pos,
                    format!("integer constant {v} overflows int"),
                );
            }
        }

        ExprKind::Unary { op, operand } => {
            if *op == UnaryOp::Neg {
                if let ExprKind::IntLit(v) = operand.kind {
                    if int_in_range(-v).is_none() {
                        sink.report(
                            DiagnosticKind::ConstantOverflow,
                            expr.pos,
                            format!("integer constant -{v} overflows int"),
                        );
                    }
                    return;
                }
                if let Some(Value::Int(k)) = fold(operand) {
                    if k.checked_neg().is_none() {
                        sink.report(
                            DiagnosticKind::ConstantOverflow,
                            expr.pos,
                            "constant expression overflows int",
                        );
                    }
                }
            }
            check_overflow(operand, sink);
        }

        ExprKind::Binary { op, left, right } => {
            // Operands first: their own overflows fold to None here, so a
            // nested overflow is never double-reported at the parent.
            check_overflow(left, sink);
            check_overflow(right, sink);

            if op.is_arithmetic() {
                if let (Some(Value::Int(a)), Some(Value::Int(b))) = (fold(left), fold(right)) {
                    let overflowed = match op {
                        BinaryOp::Add => a.checked_add(b).is_none(),
                        BinaryOp::Sub => a.checked_sub(b).is_none(),
                        BinaryOp::Mul => a.checked_mul(b).is_none(),
                        BinaryOp::Div => b != 0 && a.checked_div(b).is_none(),
                        _ => false,
                    };
                    if overflowed {
                        sink.report(
                            DiagnosticKind::ConstantOverflow,
                            expr.pos,
                            "constant expression overflows int",
                        );
                    }
                }
            }
        }

        ExprKind::Call { args, .. } => {
            for arg in args {
                check_overflow(arg, sink);
            }
        }

        ExprKind::BoolLit(_) | ExprKind::Var(_) => {}
    }
}
