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

pub use permcalc_core::{
    Atom, BinaryOp, EvaluationError, FormulaError, Loc, ParseError, ParseErrorKind,
    PermissionSet, Position, ResolutionError, Resolver, ResolverError, Strategy, TraceEvent,
    TraceSink, TracingSink,
};

use permcalc_core::{parse_expr, Evaluator, Expr};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::resolve::DefaultResolver;

/// A parsed permission formula, such as `roles/browser - @viewer.yaml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    expr: Expr,
}

impl Formula {
    /// Parse a formula
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(Self {
            expr: parse_expr(text)?,
        })
    }

    /// Compute the permissions this formula denotes, asking `resolver` for
    /// the permissions of each role it mentions
    pub fn evaluate<R: Resolver + ?Sized>(
        &self,
        resolver: &R,
    ) -> Result<PermissionSet, EvaluationError> {
        Evaluator::new(resolver).interpret(&self.expr)
    }

    /// Like [`Formula::evaluate`], reporting every step to `sink`
    pub fn evaluate_with_trace<R: Resolver + ?Sized>(
        &self,
        resolver: &R,
        sink: &dyn TraceSink,
    ) -> Result<PermissionSet, EvaluationError> {
        Evaluator::new(resolver)
            .with_trace(sink)
            .interpret(&self.expr)
    }

    /// Evaluate with `gcloud` for named roles and the file system for
    /// `@path` roles
    pub fn evaluate_default(&self) -> Result<PermissionSet, EvaluationError> {
        self.evaluate(&DefaultResolver::default())
    }

    /// The parse tree, one production per line, indented with `|`
    pub fn tree(&self) -> String {
        self.expr.pretty("|")
    }

    /// Every role reference, in the order they are written
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.expr.atoms()
    }

    /// The underlying expression
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl FromStr for Formula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Parse `text` and evaluate it with `resolver`. Trace events go to `trace`
/// if given.
pub fn evaluate<R: Resolver + ?Sized>(
    text: &str,
    resolver: &R,
    trace: Option<&dyn TraceSink>,
) -> Result<PermissionSet, FormulaError> {
    permcalc_core::evaluate(text, resolver, trace)
}
