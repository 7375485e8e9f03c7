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

use std::fmt::{self, Display};

use miette::Diagnostic;
use thiserror::Error;

use super::lexer::TokenKind;
use super::loc::Loc;

/// An error encountered while lexing or parsing a formula. Every parse error
/// points at the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    kind: ParseErrorKind,
    loc: Loc,
}

// custom impl of `Diagnostic`: source location is from .loc, everything else
// forwarded to .kind
impl Diagnostic for ParseError {
    impl_diagnostic_from_source_loc_field!(loc);

    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.kind.code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.kind.help()
    }
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, loc: Loc) -> Self {
        Self { kind, loc }
    }

    /// What went wrong
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Where it went wrong
    pub fn source_loc(&self) -> &Loc {
        &self.loc
    }

    /// `true` for errors raised by the lexer (a character that can't start
    /// any token), `false` for grammar violations.
    pub fn is_lexical(&self) -> bool {
        matches!(self.kind, ParseErrorKind::UnrecognizedCharacter(_))
    }
}

/// The different ways a formula can fail to parse
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseErrorKind {
    /// A character that isn't an operator, a parenthesis, `@`, whitespace or
    /// part of a role name
    #[error("unrecognized character `{0}`")]
    #[diagnostic(
        code(permcalc::parse::unrecognized_character),
        help("role names may only contain ASCII letters, digits, `_`, `/` and `.`")
    )]
    UnrecognizedCharacter(char),

    /// The formula contains no tokens at all
    #[error("formula is empty")]
    #[diagnostic(
        code(permcalc::parse::empty_formula),
        help("try a formula such as `roles/browser - roles/viewer`")
    )]
    EmptyFormula,

    /// A token appeared where it isn't allowed
    #[error("unexpected `{found}`, expected {expected}")]
    #[diagnostic(code(permcalc::parse::unexpected_token))]
    UnexpectedToken {
        /// The token we got
        found: TokenKind,
        /// What would have been accepted here
        expected: Expected,
    },

    /// The formula stopped where more input was required
    #[error("unexpected end of formula, expected {expected}")]
    #[diagnostic(code(permcalc::parse::unexpected_end))]
    UnexpectedEnd {
        /// What would have been accepted here
        expected: Expected,
    },

    /// The formula ended before a `(` was closed
    #[error("unclosed `(`")]
    #[diagnostic(
        code(permcalc::parse::unclosed_paren),
        help("add a matching `)` to close this group")
    )]
    UnclosedParen,

    /// A complete formula was followed by more tokens
    #[error("unexpected `{found}` after the end of the formula")]
    #[diagnostic(
        code(permcalc::parse::trailing_input),
        help("join role references with one of `+`, `-`, `*` or `^`")
    )]
    TrailingInput {
        /// The first token that was not consumed
        found: TokenKind,
    },

    /// `@` was not followed by a file path
    #[error("expected a file path after `@`, found `{found}`")]
    #[diagnostic(
        code(permcalc::parse::missing_file_name),
        help("`@` reads a role from a file, as in `@roles/viewer.yaml`")
    )]
    MissingFileName {
        /// The token found in place of the path
        found: TokenKind,
    },
}

/// Description of what the parser would have accepted, for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A role name, `@FILE` or a parenthesized group
    Atom,
    /// A closing parenthesis, or an operator continuing the group
    CloseParen,
}

impl Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Atom => write!(f, "a role name, `@` followed by a file path, or `(`"),
            Expected::CloseParen => write!(f, "`)` or an operator"),
        }
    }
}
