//! Generic fixed-point dataflow solver.
//!
//! The four analyses differ only in direction, lattice element, boundary
//! value, join, transfer, and (for the path-sensitive one) edge
//! refinement; [`Analysis`] captures exactly that parameterization and
//! [`solve`] is the one engine they all share.
//!
//! The lattice contract: `join` must be associative, commutative, and
//! idempotent with `bottom` as identity; `transfer` and `refine_edge` must
//! be monotone. Every lattice used here has finite height, so the worklist
//! terminates. Results are order-independent; the worklist is still seeded
//! in reverse postorder (forward) or postorder (backward) so that runs are
//! reproducible statement-for-statement.

pub mod bitset;

use crate::cfg::{BlockId, Cfg, EdgeLabel, ENTRY, EXIT};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

pub trait Analysis<'a> {
    type Fact: Clone + PartialEq;

    fn direction(&self) -> Direction;

    /// The least element; identity for `join`. Blocks never reached by
    /// propagation keep this value.
    fn bottom(&self, cfg: &Cfg<'a>) -> Self::Fact;

    /// The fact seeded at the start node: entry for forward analyses,
    /// exit for backward ones.
    fn boundary(&self, cfg: &Cfg<'a>) -> Self::Fact;

    fn join(&self, into: &mut Self::Fact, from: &Self::Fact);

    /// Propagate a fact across one block. For a forward analysis `fact` is
    /// the block's IN (at its start); for a backward analysis it is the
    /// fact at the block's end.
    fn transfer(&self, cfg: &Cfg<'a>, block: BlockId, fact: &Self::Fact) -> Self::Fact;

    /// Specialize `fact` for the edge leaving `source` with `label`,
    /// before it is joined into the neighbor's pool. Identity by default;
    /// the path-sensitive analysis refines labeled branch edges here.
    fn refine_edge(
        &self,
        _cfg: &Cfg<'a>,
        _source: BlockId,
        _label: Option<EdgeLabel>,
        fact: Self::Fact,
    ) -> Self::Fact {
        fact
    }
}

/// Per-block facts at fixpoint, indexed by block id.
///
/// `input` is the fact the block's transfer consumed (block start for
/// forward analyses, block end for backward ones); `output` is what the
/// transfer produced.
#[derive(Debug)]
pub struct Solution<F> {
    pub input: Vec<F>,
    pub output: Vec<F>,
}

impl<F> Solution<F> {
    pub fn input_of(&self, block: BlockId) -> &F {
        &self.input[block.0]
    }

    pub fn output_of(&self, block: BlockId) -> &F {
        &self.output[block.0]
    }
}

/// Run `analysis` over `cfg` to a fixed point.
pub fn solve<'a, A: Analysis<'a>>(cfg: &Cfg<'a>, analysis: &A) -> Solution<A::Fact> {
    let n = cfg.len();
    let direction = analysis.direction();
    let mut input: Vec<A::Fact> = (0..n).map(|_| analysis.bottom(cfg)).collect();
    let mut output: Vec<A::Fact> = (0..n).map(|_| analysis.bottom(cfg)).collect();

    let (order, start) = match direction {
        Direction::Forward => (cfg.reverse_postorder(), ENTRY),
        Direction::Backward => (cfg.postorder(), EXIT),
    };

    let mut queue: VecDeque<BlockId> = order.iter().copied().collect();
    let mut queued = vec![false; n];
    for &block in &order {
        queued[block.0] = true;
    }

    while let Some(block) = queue.pop_front() {
        queued[block.0] = false;

        let mut fact = if block == start {
            analysis.boundary(cfg)
        } else {
            analysis.bottom(cfg)
        };
        for (source, label) in incoming(cfg, direction, block) {
            let edge_fact = analysis.refine_edge(cfg, source, label, output[source.0].clone());
            analysis.join(&mut fact, &edge_fact);
        }

        let new_output = analysis.transfer(cfg, block, &fact);
        input[block.0] = fact;

        if new_output != output[block.0] {
            output[block.0] = new_output;
            for (next, _) in outgoing(cfg, direction, block) {
                if !queued[next.0] {
                    queued[next.0] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    Solution { input, output }
}

/// Neighbors whose output feeds this block, with the label of the
/// connecting edge: predecessors for forward, successors for backward.
fn incoming(
    cfg: &Cfg<'_>,
    direction: Direction,
    block: BlockId,
) -> Vec<(BlockId, Option<EdgeLabel>)> {
    match direction {
        Direction::Forward => cfg.predecessors(block).to_vec(),
        Direction::Backward => cfg.successors(block),
    }
}

/// Neighbors to re-enqueue when this block's output changes.
fn outgoing(
    cfg: &Cfg<'_>,
    direction: Direction,
    block: BlockId,
) -> Vec<(BlockId, Option<EdgeLabel>)> {
    match direction {
        Direction::Forward => cfg.successors(block),
        Direction::Backward => cfg.predecessors(block).to_vec(),
    }
}
