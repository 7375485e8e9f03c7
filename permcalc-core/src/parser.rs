/*
 * Copyright Cedar Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! This module contains the parser for permcalc formulas.
//!
//! The grammar, from lowest to highest precedence:
//!
//! ```text
//! expr    = product ( ("+" | "-") product )*
//! product = atom ( ("*" | "^") atom )*
//! atom    = "@" IDENT | IDENT | "(" expr ")"
//! IDENT   = [A-Za-z0-9_/.]+
//! ```
//!
//! Both binary tiers are left-associative.

/// error handling utilities
pub mod err;
/// Step one: convert text to tokens
pub mod lexer;
/// Source locations
mod loc;

pub use err::{Expected, ParseError, ParseErrorKind};
pub use loc::{Loc, Position};

use std::iter::Peekable;
use std::sync::Arc;
use std::vec::IntoIter;

use crate::ast::{BinaryOp, Expr, Strategy};
use crate::stack::ensure_sufficient_stack;
use lexer::{Token, TokenKind};

/// Parse a complete formula into an [`Expr`]
pub fn parse_expr(text: &str) -> Result<Expr, ParseError> {
    let src: Arc<str> = Arc::from(text);
    let tokens = lexer::tokenize(&src)?;
    Parser::new(tokens, src).parse_formula()
}

impl std::str::FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_expr(s)
    }
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    /// Returned once `tokens` is exhausted
    eof: Token,
}

impl Parser {
    fn new(tokens: Vec<Token>, src: Arc<str>) -> Self {
        let end = src.len();
        Self {
            tokens: tokens.into_iter().peekable(),
            eof: Token {
                kind: TokenKind::Eof,
                loc: Loc::new(end..end, src),
            },
        }
    }

    fn peek(&mut self) -> &Token {
        self.tokens.peek().unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        self.tokens.next().unwrap_or_else(|| self.eof.clone())
    }

    fn parse_formula(mut self) -> Result<Expr, ParseError> {
        if self.peek().kind == TokenKind::Eof {
            let whole = self.eof.loc.span(0..self.eof.loc.end());
            return Err(ParseError::new(ParseErrorKind::EmptyFormula, whole));
        }
        let expr = self.parse_sum()?;
        let next = self.advance();
        match next.kind {
            TokenKind::Eof => Ok(expr),
            found => Err(ParseError::new(
                ParseErrorKind::TrailingInput { found },
                next.loc,
            )),
        }
    }

    /// `product ( ("+" | "-") product )*`
    fn parse_sum(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_product()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Or,
                TokenKind::Minus => BinaryOp::Diff,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_product()?;
            left = Expr::binary_app(op, left, right);
        }
    }

    /// `atom ( ("*" | "^") atom )*`
    fn parse_product(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_atom()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::And,
                TokenKind::Caret => BinaryOp::Xor,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_atom()?;
            left = Expr::binary_app(op, left, right);
        }
    }

    /// `"@" IDENT | IDENT | "(" expr ")"`
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(id) => Ok(Expr::atom(Strategy::Named, id).with_source_loc(token.loc)),
            TokenKind::At => {
                let path = self.advance();
                match path.kind {
                    TokenKind::Ident(id) => Ok(Expr::atom(Strategy::File, id)
                        .with_source_loc(token.loc.join(&path.loc))),
                    found => Err(ParseError::new(
                        ParseErrorKind::MissingFileName { found },
                        path.loc,
                    )),
                }
            }
            TokenKind::LParen => {
                let inner = ensure_sufficient_stack(|| self.parse_sum())?;
                let close = self.advance();
                match close.kind {
                    TokenKind::RParen => Ok(inner),
                    TokenKind::Eof => Err(ParseError::new(ParseErrorKind::UnclosedParen, token.loc)),
                    found => Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken {
                            found,
                            expected: Expected::CloseParen,
                        },
                        close.loc,
                    )),
                }
            }
            TokenKind::Eof => Err(ParseError::new(
                ParseErrorKind::UnexpectedEnd {
                    expected: Expected::Atom,
                },
                token.loc,
            )),
            found => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found,
                    expected: Expected::Atom,
                },
                token.loc,
            )),
        }
    }
}
