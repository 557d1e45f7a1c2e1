//! Name resolution and type checking.
//!
//! Lowers the surface AST into the typed AST: a two-pass walk that first
//! collects function signatures, then binds each body. All defects are
//! reported through the diagnostic sink and binding continues with a
//! recovery symbol, so one run surfaces every front-end problem it can.
//!
//! Type rules: arithmetic and relational operators require `int`; equality
//! requires same-typed operands; conditions, `!`, and the logical operators
//! accept `int` or `bool` (C truthiness, which the zero analysis relies on
//! for branch refinement).

use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::semantic::symbols::{
    FuncSig, FuncTable, ScopeStack, Symbol, SymbolId, SymbolKind, SymbolTable, Ty,
};
use crate::semantic::typed;
use crate::syntax::ast::{self, BinaryOp, Pos, UnaryOp};

/// Bind a whole program, emitting front-end diagnostics into `sink`.
pub fn bind_program(program: &ast::Program, sink: &mut DiagnosticSink) -> typed::Program {
    let functions = collect_signatures(program, sink);
    check_main_signature(&functions, sink);

    let bound = program
        .functions
        .iter()
        .map(|f| FunctionBinder::new(&functions, sink).bind(f))
        .collect();

    typed::Program { functions: bound }
}

/// Pass 1: declare every function, checking for redeclarations.
fn collect_signatures(program: &ast::Program, sink: &mut DiagnosticSink) -> FuncTable {
    let mut table = FuncTable::new();
    for f in &program.functions {
        if table.contains_key(&f.name) {
            sink.report(
                DiagnosticKind::Redeclaration,
                f.pos,
                format!("redeclaration of function '{}'", f.name),
            );
            continue;
        }
        table.insert(
            f.name.clone(),
            FuncSig {
                name: f.name.clone(),
                return_ty: f.return_type.into(),
                params: f.params.iter().map(|p| p.type_name.into()).collect(),
                pos: f.pos,
            },
        );
    }
    table
}

/// If an entry function exists, it must be `int main()`.
fn check_main_signature(functions: &FuncTable, sink: &mut DiagnosticSink) {
    let Some(main) = functions.get("main") else {
        return;
    };
    if main.return_ty != Ty::Int {
        sink.report(
            DiagnosticKind::InvalidMain,
            main.pos,
            "function 'main' must return int",
        );
    }
    if !main.params.is_empty() {
        sink.report(
            DiagnosticKind::InvalidMain,
            main.pos,
            "function 'main' must take no parameters",
        );
    }
}

struct FunctionBinder<'a> {
    functions: &'a FuncTable,
    sink: &'a mut DiagnosticSink,
    table: SymbolTable,
    scopes: ScopeStack,
    return_ty: Ty,
}

impl<'a> FunctionBinder<'a> {
    fn new(functions: &'a FuncTable, sink: &'a mut DiagnosticSink) -> Self {
        Self {
            functions,
            sink,
            table: SymbolTable::new(),
            scopes: ScopeStack::new(),
            return_ty: Ty::Int,
        }
    }

    fn bind(mut self, function: &ast::Function) -> typed::Function {
        self.return_ty = function.return_type.into();
        self.scopes.push();

        let mut params = Vec::new();
        for param in &function.params {
            if self.scopes.lookup_current(&param.name).is_some() {
                self.sink.report(
                    DiagnosticKind::Redeclaration,
                    param.pos,
                    format!("redeclaration of parameter '{}'", param.name),
                );
                continue;
            }
            let id = self.table.define(Symbol {
                name: param.name.clone(),
                ty: param.type_name.into(),
                kind: SymbolKind::Param,
                scope: self.scopes.current_id(),
                pos: param.pos,
            });
            self.scopes.declare(&param.name, id);
            params.push(id);
        }

        let body = self.bind_block(&function.body);
        self.scopes.pop();

        typed::Function {
            name: function.name.clone(),
            pos: function.pos,
            params,
            return_ty: self.return_ty,
            symbols: self.table,
            body,
        }
    }

    fn bind_block(&mut self, block: &ast::Block) -> typed::Block {
        self.scopes.push();
        let statements = block.statements.iter().map(|s| self.bind_stmt(s)).collect();
        self.scopes.pop();
        typed::Block {
            pos: block.pos,
            end: block.end,
            statements,
        }
    }

    fn bind_stmt(&mut self, stmt: &ast::Stmt) -> typed::Stmt {
        match stmt {
            ast::Stmt::Decl {
                pos,
                type_name,
                name,
                init,
            } => {
                let decl_ty: Ty = (*type_name).into();

                // The declared name is in scope inside its own initializer;
                // definite assignment flags `int x = x;`, not the binder.
                let symbol = match self.scopes.lookup_current(name) {
                    Some(existing) => {
                        self.sink.report(
                            DiagnosticKind::Redeclaration,
                            *pos,
                            format!("redeclaration of variable '{name}'"),
                        );
                        existing
                    }
                    None => {
                        let id = self.table.define(Symbol {
                            name: name.clone(),
                            ty: decl_ty,
                            kind: SymbolKind::Local,
                            scope: self.scopes.current_id(),
                            pos: *pos,
                        });
                        self.scopes.declare(name, id);
                        id
                    }
                };

                let init = init.as_ref().map(|e| self.bind_expr(e));
                if let Some(init) = &init {
                    if init.ty != decl_ty {
                        self.sink.report(
                            DiagnosticKind::TypeMismatch,
                            *pos,
                            format!(
                                "type mismatch in initialization of '{name}' (expected {decl_ty}, got {})",
                                init.ty
                            ),
                        );
                    }
                }

                typed::Stmt::Decl {
                    pos: *pos,
                    symbol,
                    init,
                }
            }

            ast::Stmt::Assign { pos, name, value } => {
                let value = self.bind_expr(value);
                let symbol = match self.scopes.lookup(name) {
                    Some(id) => {
                        let target_ty = self.table.get(id).ty;
                        if value.ty != target_ty {
                            self.sink.report(
                                DiagnosticKind::TypeMismatch,
                                *pos,
                                format!(
                                    "type mismatch in assignment to '{name}' (expected {target_ty}, got {})",
                                    value.ty
                                ),
                            );
                        }
                        id
                    }
                    None => {
                        self.sink.report(
                            DiagnosticKind::UndeclaredVariable,
                            *pos,
                            format!("use of undeclared variable '{name}'"),
                        );
                        self.recovery_symbol(name, value.ty, *pos)
                    }
                };
                typed::Stmt::Assign {
                    pos: *pos,
                    symbol,
                    value,
                }
            }

            ast::Stmt::If {
                pos,
                condition,
                then_body,
                else_body,
            } => typed::Stmt::If {
                pos: *pos,
                condition: self.bind_expr(condition),
                then_body: self.bind_block(then_body),
                else_body: else_body.as_ref().map(|b| self.bind_block(b)),
            },

            ast::Stmt::While {
                pos,
                condition,
                body,
            } => typed::Stmt::While {
                pos: *pos,
                condition: self.bind_expr(condition),
                body: self.bind_block(body),
            },

            ast::Stmt::Return { pos, value } => {
                let value = value.as_ref().map(|e| self.bind_expr(e));
                match &value {
                    None => self.sink.report(
                        DiagnosticKind::TypeMismatch,
                        *pos,
                        format!(
                            "missing return value in function returning {}",
                            self.return_ty
                        ),
                    ),
                    Some(v) if v.ty != self.return_ty => self.sink.report(
                        DiagnosticKind::TypeMismatch,
                        *pos,
                        format!(
                            "return type mismatch (expected {}, got {})",
                            self.return_ty, v.ty
                        ),
                    ),
                    Some(_) => {}
                }
                typed::Stmt::Return { pos: *pos, value }
            }

            ast::Stmt::Print { pos, value } => typed::Stmt::Print {
                pos: *pos,
                value: self.bind_expr(value),
            },

            ast::Stmt::Block(block) => typed::Stmt::Block(self.bind_block(block)),
        }
    }

    fn bind_expr(&mut self, expr: &ast::Expr) -> typed::Expr {
        match expr {
            ast::Expr::IntLit { pos, value } => typed::Expr {
                pos: *pos,
                ty: Ty::Int,
                kind: typed::ExprKind::IntLit(*value),
            },

            ast::Expr::BoolLit { pos, value } => typed::Expr {
                pos: *pos,
                ty: Ty::Bool,
                kind: typed::ExprKind::BoolLit(*value),
            },

            ast::Expr::Var { pos, name } => {
                let symbol = match self.scopes.lookup(name) {
                    Some(id) => id,
                    None => {
                        self.sink.report(
                            DiagnosticKind::UndeclaredVariable,
                            *pos,
                            format!("use of undeclared variable '{name}'"),
                        );
                        self.recovery_symbol(name, Ty::Int, *pos)
                    }
                };
                typed::Expr {
                    pos: *pos,
                    ty: self.table.get(symbol).ty,
                    kind: typed::ExprKind::Var(symbol),
                }
            }

            ast::Expr::Unary { pos, op, operand } => {
                let operand = self.bind_expr(operand);
                let ty = match op {
                    UnaryOp::Neg => {
                        if operand.ty != Ty::Int {
                            self.sink.report(
                                DiagnosticKind::TypeMismatch,
                                *pos,
                                format!("operator '-' requires an int operand, got {}", operand.ty),
                            );
                        }
                        Ty::Int
                    }
                    // Logical negation accepts int or bool (truthiness).
                    UnaryOp::Not => Ty::Bool,
                };
                typed::Expr {
                    pos: *pos,
                    ty,
                    kind: typed::ExprKind::Unary {
                        op: *op,
                        operand: Box::new(operand),
                    },
                }
            }

            ast::Expr::Binary {
                pos,
                op,
                left,
                right,
            } => {
                let left = self.bind_expr(left);
                let right = self.bind_expr(right);
                let ty = self.check_binary(*op, &left, &right, *pos);
                typed::Expr {
                    pos: *pos,
                    ty,
                    kind: typed::ExprKind::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                }
            }

            ast::Expr::Call { pos, callee, args } => {
                let args: Vec<typed::Expr> = args.iter().map(|a| self.bind_expr(a)).collect();
                let ty = self.check_call(callee, &args, *pos);
                typed::Expr {
                    pos: *pos,
                    ty,
                    kind: typed::ExprKind::Call {
                        callee: callee.clone(),
                        args,
                    },
                }
            }
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &typed::Expr,
        right: &typed::Expr,
        pos: Pos,
    ) -> Ty {
        if op.is_arithmetic() {
            if left.ty != Ty::Int || right.ty != Ty::Int {
                self.sink.report(
                    DiagnosticKind::TypeMismatch,
                    pos,
                    format!("operator '{op}' requires int operands"),
                );
            }
            Ty::Int
        } else if op.is_relational() {
            if left.ty != Ty::Int || right.ty != Ty::Int {
                self.sink.report(
                    DiagnosticKind::TypeMismatch,
                    pos,
                    format!("operator '{op}' requires int operands"),
                );
            }
            Ty::Bool
        } else if op.is_equality() {
            if left.ty != right.ty {
                self.sink.report(
                    DiagnosticKind::TypeMismatch,
                    pos,
                    format!("operator '{op}' requires operands of the same type"),
                );
            }
            Ty::Bool
        } else {
            // Logical operators accept int or bool operands (truthiness).
            debug_assert!(op.is_logical());
            Ty::Bool
        }
    }

    fn check_call(&mut self, callee: &str, args: &[typed::Expr], pos: Pos) -> Ty {
        let Some(sig) = self.functions.get(callee) else {
            if self.scopes.lookup(callee).is_some() {
                self.sink.report(
                    DiagnosticKind::NotAFunction,
                    pos,
                    format!("'{callee}' is not a function"),
                );
            } else {
                self.sink.report(
                    DiagnosticKind::UndefinedFunction,
                    pos,
                    format!("call to undefined function '{callee}'"),
                );
            }
            return Ty::Int;
        };

        if args.len() != sig.params.len() {
            self.sink.report(
                DiagnosticKind::TypeMismatch,
                pos,
                format!(
                    "function '{callee}' expects {} argument(s), got {}",
                    sig.params.len(),
                    args.len()
                ),
            );
        } else {
            for (index, (arg, expected)) in args.iter().zip(&sig.params).enumerate() {
                if arg.ty != *expected {
                    self.sink.report(
                        DiagnosticKind::TypeMismatch,
                        arg.pos,
                        format!(
                            "argument {} of '{callee}' has type {}, expected {expected}",
                            index + 1,
                            arg.ty
                        ),
                    );
                }
            }
        }
        sig.return_ty
    }

    /// Define a stand-in symbol for an unresolved name so later uses bind
    /// cleanly and the analyses stay total.
    fn recovery_symbol(&mut self, name: &str, ty: Ty, pos: Pos) -> SymbolId {
        let id = self.table.define(Symbol {
            name: name.to_string(),
            ty,
            kind: SymbolKind::Local,
            scope: self.scopes.current_id(),
            pos,
        });
        self.scopes.declare(name, id);
        id
    }
}
