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

//! Shared helpers for permcalc tests, also available to downstream crates
//! with the `test-util` feature.

// PANIC SAFETY: testing code
#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::collections::HashMap;

use crate::ast::{PermissionSet, Strategy};
use crate::evaluator::{TraceEvent, TraceSink};
use crate::resolver::{Resolver, ResolverError};

/// An error message (and optionally help text) which a test expects to see
#[derive(Debug, Clone)]
pub struct ExpectedErrorMessage<'a> {
    /// Expected contents of `Display`, or expected prefix of `Display` if `prefix` is `true`
    error: &'a str,
    /// Expected contents of `help()`, or `None` if no help
    help: Option<&'a str>,
    /// If `true`, then `error` and `help` are interpreted as expected prefixes
    prefix: bool,
}

impl<'a> ExpectedErrorMessage<'a> {
    /// Expect the given exact error message and no help text.
    pub fn error(msg: &'a str) -> Self {
        Self {
            error: msg,
            help: None,
            prefix: false,
        }
    }

    /// Expect the given exact error message and help text.
    pub fn error_and_help(error: &'a str, help: &'a str) -> Self {
        Self {
            error,
            help: Some(help),
            prefix: false,
        }
    }

    /// Expect the error message to start with the given text, and expect no help text.
    pub fn error_starts_with(msg: &'a str) -> Self {
        Self {
            error: msg,
            help: None,
            prefix: true,
        }
    }
}

/// Expect that the given `err` is an error with the given `ExpectedErrorMessage`.
///
/// `src` is the original formula, just for better assertion-failure messages.
#[track_caller]
pub fn expect_err(src: &str, err: &impl miette::Diagnostic, msg: &ExpectedErrorMessage<'_>) {
    let error = err.to_string();
    let help = err.help().map(|h| h.to_string());
    if msg.prefix {
        assert!(
            error.starts_with(msg.error),
            "for the following input:\n{src}\nactual error did not start with the expected prefix\n  actual error: {error}\n  expected prefix: {}",
            msg.error,
        );
        match (help.as_deref(), msg.help) {
            (Some(actual), Some(expected)) => assert!(
                actual.starts_with(expected),
                "for the following input:\n{src}\nactual help did not start with the expected prefix\n  actual help: {actual}\n  expected help: {expected}",
            ),
            (None, None) => (),
            (Some(actual), None) => panic!(
                "for the following input:\n{src}\ndid not expect a help message, but found one: {actual}"
            ),
            (None, Some(expected)) => panic!(
                "for the following input:\n{src}\ndid not find a help message, but expected one: {expected}"
            ),
        }
    } else {
        assert_eq!(
            &error, msg.error,
            "for the following input:\n{src}\nactual error did not match expected",
        );
        assert_eq!(
            help.as_deref(),
            msg.help,
            "for the following input:\n{src}\nactual help did not match expected",
        );
    }
}

/// Expect that the given `err` has a (single) source location, where the
/// contents of that source location are `snippet`.
#[track_caller]
// PANIC SAFETY: testing
#[allow(clippy::indexing_slicing)]
pub fn expect_source_snippet(src: &str, err: &impl miette::Diagnostic, snippet: &str) {
    use itertools::Itertools;
    let labels = err.labels().unwrap_or_else(|| {
        panic!("for the following input:\n{src}\ndid not find a source location, but expected one")
    });
    let label = labels.exactly_one().unwrap_or_else(|labels| {
        panic!(
            "for the following input:\n{src}\nexpected exactly one source location, but found {}",
            labels.count(),
        )
    });
    let span = label.inner();
    let actual_snippet = &src[span.offset()..span.offset() + span.len()];
    assert_eq!(
        actual_snippet, snippet,
        "for the following input:\n{src}\nexpected source snippet to be:\n  {snippet}\nbut it was:\n  {actual_snippet}\n",
    );
}

/// Build a [`PermissionSet`] from string literals
pub fn perms(items: &[&str]) -> PermissionSet {
    items.iter().map(|p| (*p).to_owned()).collect()
}

/// In-memory [`Resolver`] which remembers every lookup it was asked for
#[derive(Debug, Default)]
pub struct MapResolver {
    roles: HashMap<(Strategy, String), PermissionSet>,
    calls: RefCell<Vec<(Strategy, String)>>,
}

impl MapResolver {
    /// A resolver that knows no roles
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `id` for named lookups
    pub fn with_named(self, id: &str, permissions: &[&str]) -> Self {
        self.with(Strategy::Named, id, permissions)
    }

    /// Answer `path` for file lookups
    pub fn with_file(self, path: &str, permissions: &[&str]) -> Self {
        self.with(Strategy::File, path, permissions)
    }

    fn with(mut self, strategy: Strategy, id: &str, permissions: &[&str]) -> Self {
        self.roles
            .insert((strategy, id.to_owned()), perms(permissions));
        self
    }

    /// Every lookup so far, in order
    pub fn calls(&self) -> Vec<(Strategy, String)> {
        self.calls.borrow().clone()
    }
}

impl Resolver for MapResolver {
    fn resolve(&self, strategy: Strategy, id: &str) -> Result<PermissionSet, ResolverError> {
        self.calls.borrow_mut().push((strategy, id.to_owned()));
        self.roles
            .get(&(strategy, id.to_owned()))
            .cloned()
            .ok_or_else(|| ResolverError::new(format!("no role named `{id}`")))
    }
}

/// [`TraceSink`] which keeps the rendered events
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: RefCell<Vec<String>>,
}

impl CollectingSink {
    /// Rendered events, in the order they were recorded
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl TraceSink for CollectingSink {
    fn record(&self, event: &TraceEvent) {
        self.lines.borrow_mut().push(event.to_string());
    }
}
