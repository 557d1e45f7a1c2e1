//! Recursive-descent parser for MiniC.
//!
//! Grammar:
//!
//! ```text
//! program    ::= function*
//! function   ::= type IDENT "(" params ")" block
//! params     ::= (type IDENT ("," type IDENT)*)?
//! block      ::= "{" statement* "}"
//! statement  ::= var_decl | assign | if | while | return | print | block
//! expr       ::= logical_or
//! ```
//!
//! Expression parsing is precedence climbing: `||` < `&&` < equality <
//! relational < additive < multiplicative < unary.

use crate::errors::FrontendError;
use crate::syntax::ast::{
    BinaryOp, Block, Expr, Function, Param, Pos, Program, Stmt, TypeName, UnaryOp,
};
use crate::syntax::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type ParseResult<T> = Result<T, FrontendError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a whole translation unit.
    pub fn parse(mut self) -> ParseResult<Program> {
        let mut functions = Vec::new();
        while !self.is_at_end() {
            functions.push(self.parse_function()?);
        }
        Ok(Program { functions })
    }

    // -------------------------------------------------------------
    // Token handling
    // -------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    /// Consume the current token if it matches, reporting whether it did.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> ParseResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            Err(FrontendError::new(
                format!("{context}: expected {}, found {}", kind.describe(), found.kind.describe()),
                found.pos,
            ))
        }
    }

    fn expect_ident(&mut self, context: &str) -> ParseResult<(String, Pos)> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok((name, token.pos))
            }
            other => Err(FrontendError::new(
                format!("{context}: expected identifier, found {}", other.describe()),
                token.pos,
            )),
        }
    }

    /// Consume a type keyword (`int` / `bool`) if present.
    fn eat_type(&mut self) -> Option<(TypeName, Pos)> {
        let pos = self.peek().pos;
        match self.peek().kind {
            TokenKind::Int => {
                self.advance();
                Some((TypeName::Int, pos))
            }
            TokenKind::Bool => {
                self.advance();
                Some((TypeName::Bool, pos))
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------
    // Top-level constructs
    // -------------------------------------------------------------

    fn parse_function(&mut self) -> ParseResult<Function> {
        let Some((return_type, pos)) = self.eat_type() else {
            let found = self.peek();
            return Err(FrontendError::new(
                format!(
                    "expected function return type, found {}",
                    found.kind.describe()
                ),
                found.pos,
            ));
        };

        let (name, _) = self.expect_ident("function definition")?;
        self.expect(TokenKind::LParen, &format!("function '{name}'"))?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, &format!("function '{name}'"))?;
        let body = self.parse_block()?;

        Ok(Function {
            pos,
            name,
            params,
            return_type,
            body,
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let Some((type_name, pos)) = self.eat_type() else {
                let found = self.peek();
                return Err(FrontendError::new(
                    format!("expected parameter type, found {}", found.kind.describe()),
                    found.pos,
                ));
            };
            let (name, _) = self.expect_ident("parameter list")?;
            params.push(Param {
                pos,
                type_name,
                name,
            });

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let open = self.expect(TokenKind::LBrace, "block")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        let close = self.expect(TokenKind::RBrace, "block")?;
        Ok(Block {
            pos: open.pos,
            end: close.pos,
            statements,
        })
    }

    // -------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => self.parse_print(),
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Int | TokenKind::Bool => self.parse_var_decl(),
            TokenKind::Ident(_) => self.parse_assign(),
            _ => {
                let found = self.peek();
                Err(FrontendError::new(
                    format!("unexpected {} at start of statement", found.kind.describe()),
                    found.pos,
                ))
            }
        }
    }

    fn parse_var_decl(&mut self) -> ParseResult<Stmt> {
        // Caller checked that a type keyword is next.
        let (type_name, pos) = match self.eat_type() {
            Some(t) => t,
            None => unreachable!("parse_var_decl called without a leading type"),
        };
        let (name, _) = self.expect_ident("variable declaration")?;

        let init = if self.eat(&TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.expect(TokenKind::Semi, &format!("declaration of '{name}'"))?;
        Ok(Stmt::Decl {
            pos,
            type_name,
            name,
            init,
        })
    }

    fn parse_assign(&mut self) -> ParseResult<Stmt> {
        let (name, pos) = self.expect_ident("assignment")?;
        self.expect(TokenKind::Assign, &format!("assignment to '{name}'"))?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semi, &format!("assignment to '{name}'"))?;
        Ok(Stmt::Assign { pos, name, value })
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let token = self.expect(TokenKind::If, "if statement")?;
        self.expect(TokenKind::LParen, "if statement")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen, "if statement")?;
        let then_body = self.parse_block()?;

        let else_body = if self.eat(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            pos: token.pos,
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let token = self.expect(TokenKind::While, "while statement")?;
        self.expect(TokenKind::LParen, "while statement")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen, "while statement")?;
        let body = self.parse_block()?;

        Ok(Stmt::While {
            pos: token.pos,
            condition,
            body,
        })
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let token = self.expect(TokenKind::Return, "return statement")?;
        let value = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semi, "return statement")?;
        Ok(Stmt::Return {
            pos: token.pos,
            value,
        })
    }

    fn parse_print(&mut self) -> ParseResult<Stmt> {
        let token = self.expect(TokenKind::Print, "print statement")?;
        self.expect(TokenKind::LParen, "print statement")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::RParen, "print statement")?;
        self.expect(TokenKind::Semi, "print statement")?;
        Ok(Stmt::Print {
            pos: token.pos,
            value,
        })
    }

    // -------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_logical_and()?;
        while self.check(&TokenKind::OrOr) {
            self.advance();
            let right = self.parse_logical_and()?;
            left = binary(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            self.advance();
            let right = self.parse_equality()?;
            left = binary(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let token = self.advance();
        let pos = token.pos;

        match token.kind {
            TokenKind::Number(value) => Ok(Expr::IntLit { pos, value }),
            TokenKind::True => Ok(Expr::BoolLit { pos, value: true }),
            TokenKind::False => Ok(Expr::BoolLit { pos, value: false }),
            TokenKind::Ident(name) => {
                if self.eat(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen, &format!("call to '{name}'"))?;
                    Ok(Expr::Call {
                        pos,
                        callee: name,
                        args,
                    })
                } else {
                    Ok(Expr::Var { pos, name })
                }
            }
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "parenthesized expression")?;
                Ok(expr)
            }
            TokenKind::Not => {
                let operand = self.parse_factor()?;
                Ok(Expr::Unary {
                    pos,
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Minus => {
                let operand = self.parse_factor()?;
                Ok(Expr::Unary {
                    pos,
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            other => Err(FrontendError::new(
                format!("unexpected {} in expression", other.describe()),
                pos,
            )),
        }
    }

    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        pos: left.pos(),
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::Lexer;

    fn parse(source: &str) -> Program {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn parse_err(source: &str) -> FrontendError {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap_err()
    }

    #[test]
    fn test_function_structure() {
        let program = parse("int add(int a, int b) { return a + b; }");
        assert_eq!(program.functions.len(), 1);
        let f = &program.functions[0];
        assert_eq!(f.name, "add");
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.return_type, TypeName::Int);
        assert_eq!(f.body.statements.len(), 1);
    }

    #[test]
    fn test_block_records_closing_brace() {
        let program = parse("int main() {\n  return 0;\n}");
        let body = &program.functions[0].body;
        assert_eq!(body.pos, Pos::new(1, 12));
        assert_eq!(body.end, Pos::new(3, 1));
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let program = parse("int main() { return 1 + 2 * 3; }");
        let Stmt::Return {
            value: Some(Expr::Binary { op, right, .. }),
            ..
        } = &program.functions[0].body.statements[0]
        else {
            panic!("expected return of a binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            **right,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_logical_below_equality() {
        // a == 0 && b == 0 parses as (a == 0) && (b == 0)
        let program = parse("int main() { int a; int b; if (a == 0 && b == 0) { return 1; } return 0; }");
        let Stmt::If { condition, .. } = &program.functions[0].body.statements[2] else {
            panic!("expected if statement");
        };
        assert!(matches!(
            condition,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_if_else_and_nested_block() {
        let program = parse("int main() { if (true) { return 1; } else { { return 2; } } }");
        let Stmt::If { else_body, .. } = &program.functions[0].body.statements[0] else {
            panic!("expected if statement");
        };
        assert!(else_body.is_some());
    }

    #[test]
    fn test_return_without_value() {
        let program = parse("int main() { return; }");
        let Stmt::Return { value, .. } = &program.functions[0].body.statements[0] else {
            panic!("expected return statement");
        };
        assert!(value.is_none());
    }

    #[test]
    fn test_call_arguments() {
        let program = parse("int main() { return f(1, g(), x); }");
        let Stmt::Return {
            value: Some(Expr::Call { callee, args, .. }),
            ..
        } = &program.functions[0].body.statements[0]
        else {
            panic!("expected return of a call");
        };
        assert_eq!(callee, "f");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_err("int main() { int x = 1 }");
        assert!(err.message.contains("expected ';'"));
    }

    #[test]
    fn test_missing_return_type() {
        let err = parse_err("main() { return 0; }");
        assert!(err.message.contains("expected function return type"));
    }
}
