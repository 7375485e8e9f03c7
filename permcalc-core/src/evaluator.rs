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

//! This module contains the permcalc evaluator.

use crate::ast::*;
use crate::parser::{parse_expr, Loc};
use crate::resolver::Resolver;
use crate::stack::ensure_sufficient_stack;

mod err;
pub use err::*;
mod trace;
pub use trace::*;

/// Evaluator object.
///
/// Holds the resolver used for atoms and an optional trace sink. It keeps no
/// other state, so one `Evaluator` can be reused for any number of
/// formulas.
pub struct Evaluator<'e, R: Resolver + ?Sized> {
    /// Resolves every atom, each time it is reached
    resolver: &'e R,
    /// Receives one event per completed production, if set
    trace: Option<&'e dyn TraceSink>,
}

impl<R: Resolver + ?Sized> std::fmt::Debug for Evaluator<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("trace", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

impl<'e, R: Resolver + ?Sized> Evaluator<'e, R> {
    /// Create a fresh `Evaluator` which resolves atoms with `resolver`
    pub fn new(resolver: &'e R) -> Self {
        Self {
            resolver,
            trace: None,
        }
    }

    /// Report every evaluation step to `sink`
    pub fn with_trace(self, sink: &'e dyn TraceSink) -> Self {
        Self {
            trace: Some(sink),
            ..self
        }
    }

    /// Reduce `e` to a single set of permissions.
    ///
    /// Atoms are resolved strictly left to right, and the left operand of an
    /// operator is fully reduced before the right operand is started.
    /// Evaluation stops at the first resolver failure.
    pub fn interpret(&self, e: &Expr) -> Result<PermissionSet> {
        ensure_sufficient_stack(|| match e.expr_kind() {
            ExprKind::Atom(atom) => self.resolve_atom(atom, e.source_loc()),
            ExprKind::BinaryApp { op, left, right } => {
                let left = self.interpret(left)?;
                let right = self.interpret(right)?;
                if let Some(sink) = self.trace {
                    sink.record(&TraceEvent::binary(*op, e.source_loc(), &left, &right));
                }
                Ok(op.apply(left, right))
            }
        })
    }

    fn resolve_atom(&self, atom: &Atom, source_loc: Option<&Loc>) -> Result<PermissionSet> {
        if let Some(sink) = self.trace {
            sink.record(&TraceEvent::atom(atom, source_loc));
        }
        self.resolver
            .resolve(atom.strategy, &atom.id)
            .map_err(|cause| {
                EvaluationError::resolution(
                    atom.strategy,
                    atom.id.clone(),
                    source_loc.cloned(),
                    cause,
                )
            })
    }
}

/// Parse `text` and evaluate it in one go
pub fn evaluate<R: Resolver + ?Sized>(
    text: &str,
    resolver: &R,
    trace: Option<&dyn TraceSink>,
) -> std::result::Result<PermissionSet, FormulaError> {
    let expr = parse_expr(text)?;
    let evaluator = Evaluator::new(resolver);
    let evaluator = match trace {
        Some(sink) => evaluator.with_trace(sink),
        None => evaluator,
    };
    Ok(evaluator.interpret(&expr)?)
}
