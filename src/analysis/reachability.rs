//! Reachability and unreachable-code detection.
//!
//! A depth-first search from entry marks the live part of the graph,
//! composed with constant folding: a branch whose condition folds to a
//! constant only contributes its feasible edge. Everything the search
//! never visits — orphan blocks after a `return`, branches pruned by a
//! constant condition — is dead code. When in doubt (an unfoldable
//! condition) both edges are followed, so a block is only ever dead if it
//! is dead on all paths.

use crate::analysis::const_fold;
use crate::cfg::{BasicBlock, Cfg, EdgeLabel, Terminator, ENTRY};
use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::syntax::ast::Pos;

/// Compute the semantic reachable set, indexed by block id.
pub fn reachable_blocks(cfg: &Cfg<'_>) -> Vec<bool> {
    let mut reachable = vec![false; cfg.len()];
    let mut stack = vec![ENTRY];
    reachable[ENTRY.0] = true;

    while let Some(block) = stack.pop() {
        let feasible = feasible_edge(&cfg.block(block).terminator);

        for (succ, label) in cfg.successors(block) {
            if let Some(only) = feasible {
                if label != Some(only) {
                    continue;
                }
            }
            if !reachable[succ.0] {
                reachable[succ.0] = true;
                stack.push(succ);
            }
        }
    }
    reachable
}

/// The single feasible edge of a branch whose condition folds to a
/// constant; `None` means every edge is feasible.
fn feasible_edge(terminator: &Terminator<'_>) -> Option<EdgeLabel> {
    let Terminator::Branch { condition, .. } = terminator else {
        return None;
    };
    const_fold::fold(condition).map(|value| {
        if value.truthy() {
            EdgeLabel::True
        } else {
            EdgeLabel::False
        }
    })
}

/// Report one `Unreachable` warning per dead block that contains code,
/// at the location of its first statement unit.
pub fn report_unreachable(cfg: &Cfg<'_>, reachable: &[bool], sink: &mut DiagnosticSink) {
    for id in cfg.block_ids() {
        if reachable[id.0] {
            continue;
        }
        if let Some(pos) = first_location(cfg.block(id)) {
            sink.report(DiagnosticKind::Unreachable, pos, "unreachable code");
        }
    }
}

/// Where a dead block's code starts: its first unit, or a lone `return`
/// terminator. Structural blocks with no code (loop exits, join blocks)
/// yield nothing.
fn first_location(block: &BasicBlock<'_>) -> Option<Pos> {
    if let Some(unit) = block.units.first() {
        return Some(unit.pos());
    }
    match block.terminator {
        Terminator::Return { pos, .. } => Some(pos),
        _ => None,
    }
}
