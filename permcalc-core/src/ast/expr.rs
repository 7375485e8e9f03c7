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

use smol_str::SmolStr;

use super::BinaryOp;
use crate::parser::Loc;

/// Internal AST for formulas.
///
/// Parentheses never appear here; they only decide how the tree is shaped.
/// Trees may be arbitrarily deep, so cloning, comparing and dropping never
/// recurse on the native stack.
#[derive(Debug, Eq)]
pub struct Expr {
    expr_kind: ExprKind,
    source_loc: Option<Loc>,
}

/// The possible expression variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// A reference to a role, resolved at evaluation time
    Atom(Atom),
    /// Application of a set operator to two sub-formulas
    BinaryApp {
        /// The operator
        op: BinaryOp,
        /// Left operand, evaluated first
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
    },
}

/// A leaf of the formula: which role, and how to find it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// How the identifier is resolved
    pub strategy: Strategy,
    /// Role name or file path, exactly as written
    pub id: SmolStr,
}

/// How a role reference is turned into permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// A bare name, looked up from the IAM authority
    Named,
    /// `@path`, read from a local role file
    File,
}

impl Strategy {
    /// Rule name used by the tree view
    pub fn rule_name(self) -> &'static str {
        match self {
            Strategy::Named => "role_expr",
            Strategy::File => "file_expr",
        }
    }

    /// Name used in evaluation trace lines
    pub fn trace_name(self) -> &'static str {
        match self {
            Strategy::Named => "role",
            Strategy::File => "file",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Named => write!(f, "named"),
            Strategy::File => write!(f, "file"),
        }
    }
}

impl Expr {
    fn new(expr_kind: ExprKind) -> Self {
        Self {
            expr_kind,
            source_loc: None,
        }
    }

    /// Create a role reference
    pub fn atom(strategy: Strategy, id: SmolStr) -> Self {
        Self::new(ExprKind::Atom(Atom { strategy, id }))
    }

    /// Create a binary application. If both operands carry a source
    /// location, the result covers the two of them.
    pub fn binary_app(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let source_loc = match (&left.source_loc, &right.source_loc) {
            (Some(l), Some(r)) => Some(l.join(r)),
            _ => None,
        };
        Self {
            expr_kind: ExprKind::BinaryApp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            source_loc,
        }
    }

    /// Replace the source location
    pub fn with_source_loc(mut self, loc: Loc) -> Self {
        self.source_loc = Some(loc);
        self
    }

    /// Access the inner `ExprKind` for this `Expr`.
    pub fn expr_kind(&self) -> &ExprKind {
        &self.expr_kind
    }

    /// Access the `Loc` stored on the `Expr`, if any.
    pub fn source_loc(&self) -> Option<&Loc> {
        self.source_loc.as_ref()
    }

    /// Iterate over the role references in source order, which is also the
    /// order in which the evaluator resolves them.
    pub fn atoms(&self) -> Atoms<'_> {
        Atoms { stack: vec![self] }
    }

    /// Structural equality, ignoring source locations
    pub fn eq_shape(&self, other: &Expr) -> bool {
        match (&self.expr_kind, &other.expr_kind) {
            (ExprKind::Atom(a), ExprKind::Atom(b)) => a == b,
            (
                ExprKind::BinaryApp {
                    op: op1,
                    left: left1,
                    right: right1,
                },
                ExprKind::BinaryApp {
                    op: op2,
                    left: left2,
                    right: right2,
                },
            ) => {
                op1 == op2
                    && crate::stack::ensure_sufficient_stack(|| {
                        left1.eq_shape(left2) && right1.eq_shape(right2)
                    })
            }
            _ => false,
        }
    }
}

impl Clone for Expr {
    fn clone(&self) -> Self {
        crate::stack::ensure_sufficient_stack(|| Self {
            expr_kind: self.expr_kind.clone(),
            source_loc: self.source_loc.clone(),
        })
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        crate::stack::ensure_sufficient_stack(|| {
            self.source_loc == other.source_loc && self.expr_kind == other.expr_kind
        })
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        if let ExprKind::Atom(_) = self.expr_kind {
            return;
        }
        // Detach every subtree onto a work list, so each `Expr` is dropped
        // with an atom for its kind
        let mut pending = vec![std::mem::replace(&mut self.expr_kind, ExprKind::vacant())];
        while let Some(kind) = pending.pop() {
            if let ExprKind::BinaryApp {
                mut left,
                mut right,
                ..
            } = kind
            {
                pending.push(std::mem::replace(&mut left.expr_kind, ExprKind::vacant()));
                pending.push(std::mem::replace(&mut right.expr_kind, ExprKind::vacant()));
            }
        }
    }
}

impl ExprKind {
    /// Placeholder left behind when a subtree is detached
    fn vacant() -> Self {
        ExprKind::Atom(Atom {
            strategy: Strategy::Named,
            id: SmolStr::default(),
        })
    }
}

/// Iterator returned by [`Expr::atoms`]
#[derive(Debug)]
pub struct Atoms<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> Iterator for Atoms<'a> {
    type Item = &'a Atom;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(e) = self.stack.pop() {
            match &e.expr_kind {
                ExprKind::Atom(atom) => return Some(atom),
                ExprKind::BinaryApp { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
        None
    }
}

// PANIC SAFETY: Unit Test Code
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn atoms_in_source_order() {
        let e: Expr = "a - (@b * c) ^ d + a".parse().expect("should parse");
        let ids: Vec<_> = e
            .atoms()
            .map(|atom| (atom.strategy, atom.id.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![
                (Strategy::Named, "a"),
                (Strategy::File, "b"),
                (Strategy::Named, "c"),
                (Strategy::Named, "d"),
                (Strategy::Named, "a"),
            ]
        );
    }

    #[test]
    fn eq_shape_ignores_locations() {
        let parsed: Expr = "x * y".parse().expect("should parse");
        let built = Expr::binary_app(
            BinaryOp::And,
            Expr::atom(Strategy::Named, "x".into()),
            Expr::atom(Strategy::Named, "y".into()),
        );
        assert!(parsed.eq_shape(&built));
        assert_ne!(parsed, built);
        assert!(!parsed.eq_shape(&Expr::atom(Strategy::Named, "x".into())));
    }

    fn right_nested(depth: usize) -> Expr {
        let src = format!("{}r1{}", "(r1 + ".repeat(depth), ")".repeat(depth));
        src.parse().expect("should parse")
    }

    #[test]
    fn deep_trees_clone_compare_and_drop() {
        let e = right_nested(100_000);
        let copy = e.clone();
        assert!(copy == e);
        assert!(copy.eq_shape(&e));
        assert_eq!(e.atoms().count(), 100_001);
        drop(copy);
        drop(e);
    }

    #[test]
    fn deep_left_nested_tree_drops() {
        let src = format!("r1{}", " - r1".repeat(100_000));
        let e: Expr = src.parse().expect("should parse");
        drop(e);
    }
}
