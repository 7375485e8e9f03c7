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

//! Printing an `Expr`, either back as a formula or as an indented tree.

use std::fmt::{self, Display, Write};

use super::{BinaryOp, Expr, ExprKind};
use crate::stack::ensure_sufficient_stack;

/// Prints the formula with the fewest parentheses that still parse back to
/// the same tree.
impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr_kind() {
            ExprKind::Atom(atom) => match atom.strategy {
                super::Strategy::Named => write!(f, "{}", atom.id),
                super::Strategy::File => write!(f, "@{}", atom.id),
            },
            ExprKind::BinaryApp { op, left, right } => {
                write_operand(f, left, *op, false)?;
                write!(f, " {op} ")?;
                write_operand(f, right, *op, true)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, e: &Expr, parent: BinaryOp, is_right: bool) -> fmt::Result {
    let needs_parens = match e.expr_kind() {
        ExprKind::Atom(_) => false,
        ExprKind::BinaryApp { op, .. } => {
            op.precedence() < parent.precedence()
                || (is_right && op.precedence() == parent.precedence())
        }
    };
    ensure_sufficient_stack(|| {
        if needs_parens {
            write!(f, "({e})")
        } else {
            write!(f, "{e}")
        }
    })
}

impl Expr {
    /// Render the tree one node per line. Children sit one `indent` deeper
    /// than their parent, and an atom prints its rule name, a tab and its
    /// identifier.
    ///
    /// ```text
    /// diff_expr
    /// |role_expr	roles/browser
    /// |file_expr	viewer.yaml
    /// ```
    pub fn pretty(&self, indent: &str) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, indent, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, indent: &str, level: usize) {
        for _ in 0..level {
            out.push_str(indent);
        }
        match self.expr_kind() {
            ExprKind::Atom(atom) => {
                // Writing into a `String` cannot fail
                let _ = writeln!(out, "{}\t{}", atom.strategy.rule_name(), atom.id);
            }
            ExprKind::BinaryApp { op, left, right } => {
                out.push_str(op.rule_name());
                out.push('\n');
                ensure_sufficient_stack(|| {
                    left.write_pretty(out, indent, level + 1);
                    right.write_pretty(out, indent, level + 1);
                });
            }
        }
    }
}
