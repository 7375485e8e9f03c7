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

use std::fmt::Display;

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

use crate::ast::Strategy;
use crate::parser::{Loc, ParseError};
use crate::resolver::ResolverError;

/// An error generated while evaluating a formula
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum EvaluationError {
    /// A role reference could not be resolved
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolutionError),
}

impl EvaluationError {
    /// Construct a [`ResolutionError`] for the atom at `source_loc`
    pub(crate) fn resolution(
        strategy: Strategy,
        id: SmolStr,
        source_loc: Option<Loc>,
        cause: ResolverError,
    ) -> Self {
        Self::Resolution(ResolutionError {
            strategy,
            id,
            source_loc,
            cause,
        })
    }
}

/// The resolver failed for one role reference.
///
/// Evaluation stops at the first such failure; there are no partial
/// results.
#[derive(Debug, Error)]
#[error("failed to resolve {strategy} role `{id}`")]
pub struct ResolutionError {
    strategy: Strategy,
    id: SmolStr,
    source_loc: Option<Loc>,
    #[source]
    cause: ResolverError,
}

impl Diagnostic for ResolutionError {
    impl_diagnostic_from_source_loc_opt_field!(source_loc);

    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new("permcalc::resolution"))
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        Some(&self.cause as &dyn Diagnostic)
    }
}

impl ResolutionError {
    /// Strategy of the failed reference
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Identifier of the failed reference, as written in the formula
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the failed reference appears in the formula
    pub fn source_loc(&self) -> Option<&Loc> {
        self.source_loc.as_ref()
    }

    /// What the resolver reported
    pub fn cause(&self) -> &ResolverError {
        &self.cause
    }
}

/// Either stage of turning formula text into permissions can fail
#[derive(Debug, Error, Diagnostic)]
pub enum FormulaError {
    /// The text is not a valid formula
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
    /// The formula parsed, but evaluating it failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Type alias for convenience
pub type Result<T> = std::result::Result<T, EvaluationError>;
