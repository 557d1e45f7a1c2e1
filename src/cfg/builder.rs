//! CFG construction: a structural recursion over the typed AST with a
//! current-block cursor.
//!
//! Contracts per statement kind:
//! - declarations, assignments, and prints append to the current block;
//! - `if` closes the current block with a conditional terminator and joins
//!   the branch tails in a fresh block (a missing `else` routes the False
//!   edge straight to the join);
//! - `while` builds a header that re-evaluates the condition, with a
//!   back-edge from the body tail — the edge the fixed-point solver needs
//!   for loop convergence;
//! - `return` terminates the block toward exit, and the cursor moves to a
//!   fresh orphan block so trailing statements become detectable as
//!   unreachable by plain graph reachability;
//! - nested blocks are inlined (the binder already resolved scopes).

use crate::cfg::{BasicBlock, BlockId, Cfg, StmtUnit, Terminator, ENTRY, EXIT};
use crate::semantic::typed::{Block, Function, Stmt};

/// Build the control-flow graph for one function body.
pub fn build(function: &Function) -> Cfg<'_> {
    Builder::default().run(&function.body)
}

#[derive(Default)]
struct Builder<'a> {
    units: Vec<Vec<StmtUnit<'a>>>,
    terminators: Vec<Option<Terminator<'a>>>,
}

impl<'a> Builder<'a> {
    fn run(mut self, body: &'a Block) -> Cfg<'a> {
        let entry = self.new_block();
        debug_assert_eq!(entry, ENTRY);
        let exit = self.new_block();
        debug_assert_eq!(exit, EXIT);
        self.seal(exit, Terminator::Exit);

        let tail = self.build_block(body, entry);
        // Control running off the end of the body falls through to exit;
        // the return-path check looks for exactly this edge.
        self.seal(tail, Terminator::Goto(EXIT));

        self.finish()
    }

    fn new_block(&mut self) -> BlockId {
        self.units.push(Vec::new());
        self.terminators.push(None);
        BlockId(self.units.len() - 1)
    }

    fn seal(&mut self, block: BlockId, terminator: Terminator<'a>) {
        debug_assert!(
            self.terminators[block.0].is_none(),
            "{block} sealed twice"
        );
        self.terminators[block.0] = Some(terminator);
    }

    fn push(&mut self, block: BlockId, unit: StmtUnit<'a>) {
        self.units[block.0].push(unit);
    }

    /// Build a statement list into `current`, returning the block where
    /// control ends up.
    fn build_block(&mut self, block: &'a Block, mut current: BlockId) -> BlockId {
        for stmt in &block.statements {
            current = self.build_stmt(stmt, current);
        }
        current
    }

    fn build_stmt(&mut self, stmt: &'a Stmt, current: BlockId) -> BlockId {
        match stmt {
            Stmt::Decl { pos, symbol, init } => {
                self.push(
                    current,
                    StmtUnit::Decl {
                        pos: *pos,
                        symbol: *symbol,
                        init: init.as_ref(),
                    },
                );
                current
            }

            Stmt::Assign { pos, symbol, value } => {
                self.push(
                    current,
                    StmtUnit::Assign {
                        pos: *pos,
                        symbol: *symbol,
                        value,
                    },
                );
                current
            }

            Stmt::Print { pos, value } => {
                self.push(current, StmtUnit::Print { pos: *pos, value });
                current
            }

            Stmt::Block(block) => self.build_block(block, current),

            Stmt::Return { pos, value } => {
                self.seal(
                    current,
                    Terminator::Return {
                        pos: *pos,
                        value: value.as_ref(),
                    },
                );
                // Orphan block: no predecessors, so anything that lands
                // here is unreachable in the graph.
                self.new_block()
            }

            Stmt::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                self.push(current, StmtUnit::Cond { value: condition });

                let then_block = self.new_block();
                match else_body {
                    Some(else_body) => {
                        let else_block = self.new_block();
                        let join = self.new_block();
                        self.seal(
                            current,
                            Terminator::Branch {
                                condition,
                                true_target: then_block,
                                false_target: else_block,
                            },
                        );
                        let then_tail = self.build_block(then_body, then_block);
                        self.seal(then_tail, Terminator::Goto(join));
                        let else_tail = self.build_block(else_body, else_block);
                        self.seal(else_tail, Terminator::Goto(join));
                        join
                    }
                    None => {
                        let join = self.new_block();
                        self.seal(
                            current,
                            Terminator::Branch {
                                condition,
                                true_target: then_block,
                                false_target: join,
                            },
                        );
                        let then_tail = self.build_block(then_body, then_block);
                        self.seal(then_tail, Terminator::Goto(join));
                        join
                    }
                }
            }

            Stmt::While {
                condition, body, ..
            } => {
                let header = self.new_block();
                let body_block = self.new_block();
                let after = self.new_block();

                self.seal(current, Terminator::Goto(header));
                self.push(header, StmtUnit::Cond { value: condition });
                self.seal(
                    header,
                    Terminator::Branch {
                        condition,
                        true_target: body_block,
                        false_target: after,
                    },
                );

                let body_tail = self.build_block(body, body_block);
                self.seal(body_tail, Terminator::Goto(header));

                after
            }
        }
    }

    fn finish(self) -> Cfg<'a> {
        let blocks = self
            .units
            .into_iter()
            .zip(self.terminators)
            .map(|(units, terminator)| BasicBlock {
                units,
                terminator: terminator.expect("block left unterminated"),
            })
            .collect();
        Cfg::from_blocks(blocks)
    }
}
