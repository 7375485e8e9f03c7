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

//! Scans formula text into [`Token`]s.

use std::fmt::{self, Display};
use std::sync::Arc;

use smol_str::SmolStr;

use super::err::{ParseError, ParseErrorKind};
use super::loc::Loc;

/// The kinds of token in a formula
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `+`, union
    Plus,
    /// `-`, difference
    Minus,
    /// `*`, intersection
    Star,
    /// `^`, symmetric difference
    Caret,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `@`, marks a role read from a file
    At,
    /// A role name or file path, matching `[A-Za-z0-9_/.]+`
    Ident(SmolStr),
    /// End of input
    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::At => write!(f, "@"),
            TokenKind::Ident(id) => write!(f, "{id}"),
            TokenKind::Eof => write!(f, "end of formula"),
        }
    }
}

/// A token together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was scanned
    pub kind: TokenKind,
    /// Where it was scanned
    pub loc: Loc,
}

/// Characters that may appear in a role name or file path
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.')
}

/// Split `src` into tokens, skipping whitespace. The result always ends with
/// exactly one [`TokenKind::Eof`] token, whose empty span sits at the end of
/// the input.
pub fn tokenize(src: &Arc<str>) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(Arc::clone(src));
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer {
    src: Arc<str>,
    offset: usize,
}

impl Lexer {
    fn new(src: Arc<str>) -> Self {
        Self { src, offset: 0 }
    }

    fn loc(&self, start: usize, end: usize) -> Loc {
        Loc::new(start..end, Arc::clone(&self.src))
    }

    fn rest(&self) -> &str {
        self.src.get(self.offset..).unwrap_or_default()
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let start = self.offset;
        let Some(ch) = self.rest().chars().next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                loc: self.loc(start, start),
            });
        };
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '@' => TokenKind::At,
            c if is_ident_char(c) => return Ok(self.read_ident()),
            c => {
                return Err(ParseError::new(
                    ParseErrorKind::UnrecognizedCharacter(c),
                    self.loc(start, start + c.len_utf8()),
                ))
            }
        };
        self.offset += 1;
        Ok(Token {
            kind,
            loc: self.loc(start, self.offset),
        })
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let skipped = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
        self.offset += skipped;
    }

    /// Longest match over `[A-Za-z0-9_/.]`
    fn read_ident(&mut self) -> Token {
        let start = self.offset;
        let rest = self.rest();
        let len = rest.find(|c| !is_ident_char(c)).unwrap_or(rest.len());
        let ident = SmolStr::new(rest.get(..len).unwrap_or_default());
        self.offset += len;
        Token {
            kind: TokenKind::Ident(ident),
            loc: self.loc(start, self.offset),
        }
    }
}

// PANIC SAFETY: Unit Test Code
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
#[cfg(test)]
mod test {
    use super::*;
    use cool_asserts::assert_matches;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(&Arc::from(src))
            .expect("should lex")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn operators_and_idents() {
        assert_eq!(
            kinds("roles/browser-@a.yaml*(x^y)+z"),
            vec![
                TokenKind::Ident("roles/browser".into()),
                TokenKind::Minus,
                TokenKind::At,
                TokenKind::Ident("a.yaml".into()),
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Ident("x".into()),
                TokenKind::Caret,
                TokenKind::Ident("y".into()),
                TokenKind::RParen,
                TokenKind::Plus,
                TokenKind::Ident("z".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn whitespace_is_skipped() {
        assert_eq!(
            kinds(" \t a \r\n +\x0c b "),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Plus,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   "), vec![TokenKind::Eof]);
    }

    #[test]
    fn spans() {
        let tokens = tokenize(&Arc::from("ab  +c")).expect("should lex");
        let spans: Vec<_> = tokens.iter().map(|t| (t.loc.start(), t.loc.end())).collect();
        assert_eq!(spans, vec![(0, 2), (4, 5), (5, 6), (6, 6)]);
    }

    #[test]
    fn unrecognized_character() {
        let err = tokenize(&Arc::from("a + b-c & d")).expect_err("`&` is not a token");
        assert!(err.is_lexical());
        assert_matches!(err.kind(), ParseErrorKind::UnrecognizedCharacter('&'));
        assert_eq!(err.source_loc().snippet(), Some("&"));
        assert_eq!(err.source_loc().start(), 8);
    }

    #[test]
    fn unrecognized_multibyte_character() {
        let err = tokenize(&Arc::from("rôle")).expect_err("non-ascii letters are not allowed");
        assert_matches!(err.kind(), ParseErrorKind::UnrecognizedCharacter('ô'));
        assert_eq!(err.source_loc().snippet(), Some("ô"));
        assert_eq!(err.to_string(), "unrecognized character `ô`");
    }

    #[test]
    fn hyphen_is_not_part_of_names() {
        assert_eq!(
            kinds("my-role"),
            vec![
                TokenKind::Ident("my".into()),
                TokenKind::Minus,
                TokenKind::Ident("role".into()),
                TokenKind::Eof,
            ]
        );
    }
}
