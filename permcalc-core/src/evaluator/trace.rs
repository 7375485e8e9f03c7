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

//! Observing evaluation one step at a time.

use std::fmt::{self, Display};

use itertools::Itertools;

use crate::ast::{Atom, BinaryOp, PermissionSet};
use crate::parser::Loc;

/// One completed production: an atom about to be resolved, or a binary
/// operator whose operands have both been reduced.
///
/// Displays as `[(01:01)-(01:14)] or_expr({a}, {b, c})`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Where the production appears in the formula
    pub source_loc: Option<Loc>,
    /// `role`, `file`, or the operator's rule name
    pub rule: &'static str,
    /// The identifier for atoms, the reduced operands for operators
    pub operands: Vec<String>,
}

impl TraceEvent {
    pub(crate) fn atom(atom: &Atom, source_loc: Option<&Loc>) -> Self {
        Self {
            source_loc: source_loc.cloned(),
            rule: atom.strategy.trace_name(),
            operands: vec![atom.id.to_string()],
        }
    }

    pub(crate) fn binary(
        op: BinaryOp,
        source_loc: Option<&Loc>,
        left: &PermissionSet,
        right: &PermissionSet,
    ) -> Self {
        Self {
            source_loc: source_loc.cloned(),
            rule: op.rule_name(),
            operands: vec![summarize(left), summarize(right)],
        }
    }
}

fn summarize(set: &PermissionSet) -> String {
    format!("{{{}}}", set.iter().join(", "))
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_loc {
            Some(loc) => write!(f, "[{}-{}] ", loc.start_position(), loc.end_position())?,
            None => write!(f, "[?] ")?,
        }
        write!(f, "{}({})", self.rule, self.operands.iter().join(", "))
    }
}

/// Receives a [`TraceEvent`] for every step of an evaluation. Purely
/// observational.
pub trait TraceSink {
    /// Called once per completed production, in evaluation order
    fn record(&self, event: &TraceEvent);
}

/// Sends trace events to `tracing` at `DEBUG` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: &TraceEvent) {
        tracing::debug!("{event}");
    }
}

// PANIC SAFETY: Unit Test Code
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::Strategy;
    use std::sync::Arc;
    use tracing_test::traced_test;

    #[test]
    fn display() {
        let src: Arc<str> = Arc::from("a + b");
        let event = TraceEvent::binary(
            BinaryOp::Or,
            Some(&Loc::new(0..5, src)),
            &["p2".to_owned(), "p1".to_owned()].into_iter().collect(),
            &PermissionSet::new(),
        );
        assert_eq!(event.to_string(), "[(01:01)-(01:06)] or_expr({p1, p2}, {})");

        let atom = Atom {
            strategy: Strategy::File,
            id: "/tmp/r".into(),
        };
        assert_eq!(TraceEvent::atom(&atom, None).to_string(), "[?] file(/tmp/r)");
    }

    #[test]
    #[traced_test]
    fn tracing_sink_logs_at_debug() {
        let atom = Atom {
            strategy: Strategy::Named,
            id: "roles/browser".into(),
        };
        TracingSink.record(&TraceEvent::atom(&atom, None));
        assert!(logs_contain("[?] role(roles/browser)"));
    }
}
