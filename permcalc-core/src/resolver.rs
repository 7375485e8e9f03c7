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

//! The interface between formulas and wherever role permissions live.

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::{PermissionSet, Strategy};

/// Turns a role reference into the set of permissions it denotes.
///
/// The evaluator calls [`Resolver::resolve`] once for every atom in a
/// formula, left to right, with no caching: `a + a` resolves `a` twice.
pub trait Resolver {
    /// Look up the permissions of `id` using `strategy`
    fn resolve(&self, strategy: Strategy, id: &str) -> Result<PermissionSet, ResolverError>;
}

impl<F> Resolver for F
where
    F: Fn(Strategy, &str) -> Result<PermissionSet, ResolverError>,
{
    fn resolve(&self, strategy: Strategy, id: &str) -> Result<PermissionSet, ResolverError> {
        self(strategy, id)
    }
}

/// Why a [`Resolver`] could not produce permissions.
///
/// Besides a message and an optional underlying error, it can carry a list
/// of related failures. A resolver that tries several sources uses them to
/// report every attempt.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ResolverError {
    message: String,
    help: Option<String>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    related: Vec<ResolverError>,
}

impl Diagnostic for ResolverError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("permcalc::resolver"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        if self.related.is_empty() {
            None
        } else {
            Some(Box::new(self.related.iter().map(|e| e as &dyn Diagnostic)))
        }
    }
}

impl ResolverError {
    /// An error with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
            source: None,
            related: Vec::new(),
        }
    }

    /// An error with a message, caused by `source`
    pub fn wrap(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(message)
        }
    }

    /// Attach help text
    pub fn with_help(self, help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..self
        }
    }

    /// Attach related failures, kept in the given order
    pub fn with_related(self, related: impl IntoIterator<Item = ResolverError>) -> Self {
        Self {
            related: related.into_iter().collect(),
            ..self
        }
    }

    /// The related failures, in the order they were attached
    pub fn related_errors(&self) -> &[ResolverError] {
        &self.related
    }
}
