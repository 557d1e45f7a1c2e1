//! Hand-rolled scanner for MiniC source text.
//!
//! Tracks 1-based line/column positions and skips `//` line comments.
//! Lexing is all-or-nothing: the first unexpected character aborts with a
//! [`FrontendError`] that the pipeline reports as a syntax diagnostic.

use crate::errors::FrontendError;
use crate::syntax::ast::Pos;
use crate::syntax::token::{Token, TokenKind};

pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scan the whole input into a token list terminated by `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, FrontendError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }

        tokens.push(Token::new(TokenKind::Eof, self.here()));
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, FrontendError> {
        let start = self.here();
        let ch = self.peek();

        if ch.is_ascii_alphabetic() || ch == b'_' {
            return Ok(self.scan_identifier_or_keyword(start));
        }
        if ch.is_ascii_digit() {
            return self.scan_number(start);
        }

        // Multi-character operators first.
        let two: &[u8] = &[ch, self.peek_next()];
        let double = match two {
            b"==" => Some(TokenKind::EqEq),
            b"!=" => Some(TokenKind::NotEq),
            b"<=" => Some(TokenKind::Le),
            b">=" => Some(TokenKind::Ge),
            b"&&" => Some(TokenKind::AndAnd),
            b"||" => Some(TokenKind::OrOr),
            _ => None,
        };
        if let Some(kind) = double {
            self.advance();
            self.advance();
            return Ok(Token::new(kind, start));
        }

        let single = match ch {
            b'+' => Some(TokenKind::Plus),
            b'-' => Some(TokenKind::Minus),
            b'*' => Some(TokenKind::Star),
            b'/' => Some(TokenKind::Slash),
            b'=' => Some(TokenKind::Assign),
            b'<' => Some(TokenKind::Lt),
            b'>' => Some(TokenKind::Gt),
            b'!' => Some(TokenKind::Not),
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b'{' => Some(TokenKind::LBrace),
            b'}' => Some(TokenKind::RBrace),
            b';' => Some(TokenKind::Semi),
            b',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance();
            return Ok(Token::new(kind, start));
        }

        Err(FrontendError::new(
            format!("unexpected character '{}'", ch as char),
            start,
        ))
    }

    fn scan_identifier_or_keyword(&mut self, start: Pos) -> Token {
        let lexeme = self.consume_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        let kind = TokenKind::keyword(&lexeme).unwrap_or(TokenKind::Ident(lexeme));
        Token::new(kind, start)
    }

    fn scan_number(&mut self, start: Pos) -> Result<Token, FrontendError> {
        let digits = self.consume_while(|c| c.is_ascii_digit());
        let value: i64 = digits
            .parse()
            .map_err(|_| FrontendError::new(format!("integer literal '{digits}' is too large"), start))?;
        Ok(Token::new(TokenKind::Number(value), start))
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'/' if self.peek_next() == b'/' => {
                    self.consume_while(|c| c != b'\n');
                }
                _ => break,
            }
        }
    }

    fn here(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.source[self.pos]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.pos + 1 >= self.source.len() {
            0
        } else {
            self.source[self.pos + 1]
        }
    }

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn consume_while(&mut self, predicate: impl Fn(u8) -> bool) -> String {
        let mut result = String::new();
        while !self.is_at_end() && predicate(self.peek()) {
            result.push(self.advance() as char);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("int counter while_loop"),
            vec![
                TokenKind::Int,
                TokenKind::Ident("counter".into()),
                TokenKind::Ident("while_loop".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("== != <= >= && || = < > ! + - * /"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Assign,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Not,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_line_comments_are_skipped() {
        assert_eq!(
            kinds("// EXPECT: OK\nint x;"),
            vec![
                TokenKind::Int,
                TokenKind::Ident("x".into()),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("int\n  x = 1;").tokenize().unwrap();
        assert_eq!(tokens[0].pos, Pos::new(1, 1)); // int
        assert_eq!(tokens[1].pos, Pos::new(2, 3)); // x
        assert_eq!(tokens[2].pos, Pos::new(2, 5)); // =
        assert_eq!(tokens[3].pos, Pos::new(2, 7)); // 1
    }

    #[test]
    fn test_large_literal_survives_lexing() {
        // Out-of-range i32 literals are lexed; the folding pass flags them.
        assert_eq!(
            kinds("2147483648"),
            vec![TokenKind::Number(2147483648), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("int x @ 1;").tokenize().unwrap_err();
        assert!(err.message.contains("unexpected character '@'"));
        assert_eq!(err.pos, Pos::new(1, 7));
    }
}
