//! Control-flow graph: arena-allocated basic blocks with labeled edges.
//!
//! One graph per function body, constructed once and read-only afterwards.
//! Blocks live in a `Vec` and refer to each other by dense [`BlockId`];
//! edge back-references (loop back-edges) are id-based, so there is no
//! cyclic ownership and the graph can be shared freely among analyses.
//! Block 0 is the entry, block 1 the exit.
//!
//! A basic block is an ordered list of [`StmtUnit`]s closed by exactly one
//! [`Terminator`]. Statement units borrow their expressions from the typed
//! AST, which outlives the graph.

pub mod builder;

use crate::semantic::symbols::SymbolId;
use crate::semantic::typed::Expr;
use crate::syntax::ast::Pos;

/// Dense index of a basic block within its function's CFG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub usize);

/// The entry block of every CFG.
pub const ENTRY: BlockId = BlockId(0);
/// The exit block of every CFG.
pub const EXIT: BlockId = BlockId(1);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Edge labels on conditional terminators. True is canonical-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLabel {
    True,
    False,
}

/// A straight-line statement unit inside a basic block.
#[derive(Debug)]
pub enum StmtUnit<'a> {
    Decl {
        pos: Pos,
        symbol: SymbolId,
        init: Option<&'a Expr>,
    },
    Assign {
        pos: Pos,
        symbol: SymbolId,
        value: &'a Expr,
    },
    Print {
        pos: Pos,
        value: &'a Expr,
    },
    /// Evaluation of a branch condition; always the final unit of a block
    /// with a conditional terminator.
    Cond { value: &'a Expr },
}

impl<'a> StmtUnit<'a> {
    pub fn pos(&self) -> Pos {
        match self {
            StmtUnit::Decl { pos, .. }
            | StmtUnit::Assign { pos, .. }
            | StmtUnit::Print { pos, .. } => *pos,
            StmtUnit::Cond { value } => value.pos,
        }
    }
}

/// How control leaves a basic block.
#[derive(Debug)]
pub enum Terminator<'a> {
    /// Unconditional fall-through.
    Goto(BlockId),
    /// Two-way branch on `condition`; targets are labeled True and False.
    Branch {
        condition: &'a Expr,
        true_target: BlockId,
        false_target: BlockId,
    },
    /// Return to the caller; the only edge is into the exit block.
    Return { pos: Pos, value: Option<&'a Expr> },
    /// The exit block's terminator; no successors.
    Exit,
}

impl<'a> Terminator<'a> {
    /// Successor blocks with the label of the edge leading to each.
    pub fn successors(&self) -> Vec<(BlockId, Option<EdgeLabel>)> {
        match self {
            Terminator::Goto(target) => vec![(*target, None)],
            Terminator::Branch {
                true_target,
                false_target,
                ..
            } => vec![
                (*true_target, Some(EdgeLabel::True)),
                (*false_target, Some(EdgeLabel::False)),
            ],
            Terminator::Return { .. } => vec![(EXIT, None)],
            Terminator::Exit => Vec::new(),
        }
    }

    pub fn is_fall_through(&self) -> bool {
        matches!(self, Terminator::Goto(_))
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Terminator::Return { .. })
    }
}

#[derive(Debug)]
pub struct BasicBlock<'a> {
    pub units: Vec<StmtUnit<'a>>,
    pub terminator: Terminator<'a>,
}

#[derive(Debug)]
pub struct Cfg<'a> {
    blocks: Vec<BasicBlock<'a>>,
    preds: Vec<Vec<(BlockId, Option<EdgeLabel>)>>,
}

impl<'a> Cfg<'a> {
    /// Assemble a CFG from finished blocks, computing predecessor lists.
    fn from_blocks(blocks: Vec<BasicBlock<'a>>) -> Self {
        let mut preds: Vec<Vec<(BlockId, Option<EdgeLabel>)>> = vec![Vec::new(); blocks.len()];
        for (index, block) in blocks.iter().enumerate() {
            for (succ, label) in block.terminator.successors() {
                preds[succ.0].push((BlockId(index), label));
            }
        }
        Self { blocks, preds }
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock<'a> {
        &self.blocks[id.0]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len()).map(BlockId)
    }

    pub fn successors(&self, id: BlockId) -> Vec<(BlockId, Option<EdgeLabel>)> {
        self.block(id).terminator.successors()
    }

    pub fn predecessors(&self, id: BlockId) -> &[(BlockId, Option<EdgeLabel>)] {
        &self.preds[id.0]
    }

    /// Postorder over blocks reachable from entry, following successor
    /// order (True before False). Orphan blocks do not appear.
    pub fn postorder(&self) -> Vec<BlockId> {
        let mut order = Vec::with_capacity(self.blocks.len());
        let mut visited = vec![false; self.blocks.len()];
        // Iterative DFS; each frame records how many successors are done.
        let mut stack = vec![(ENTRY, 0usize)];
        visited[ENTRY.0] = true;

        while let Some(frame) = stack.last_mut() {
            let (block, next) = *frame;
            frame.1 += 1;
            let succs = self.successors(block);
            if next < succs.len() {
                let (succ, _) = succs[next];
                if !visited[succ.0] {
                    visited[succ.0] = true;
                    stack.push((succ, 0));
                }
            } else {
                order.push(block);
                stack.pop();
            }
        }
        order
    }

    /// Reverse postorder from entry: the canonical iteration order for
    /// forward dataflow analyses.
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        let mut order = self.postorder();
        order.reverse();
        order
    }
}
