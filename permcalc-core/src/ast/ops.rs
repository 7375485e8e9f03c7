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

use super::PermissionSet;

/// Built-in set operators with exactly two arguments
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BinaryOp {
    /// Union, written `+`
    Or,
    /// Difference, written `-`
    ///
    /// Elements of the left operand that are not in the right one. Not
    /// symmetric.
    Diff,
    /// Intersection, written `*`
    And,
    /// Symmetric difference, written `^`
    Xor,
}

/// The two binding strengths of binary operators
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum Precedence {
    /// `+` and `-`
    Sum,
    /// `*` and `^`, which bind tighter
    Product,
}

impl BinaryOp {
    /// How tightly this operator binds
    pub fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Or | BinaryOp::Diff => Precedence::Sum,
            BinaryOp::And | BinaryOp::Xor => Precedence::Product,
        }
    }

    /// The operator as written in a formula
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Or => '+',
            BinaryOp::Diff => '-',
            BinaryOp::And => '*',
            BinaryOp::Xor => '^',
        }
    }

    /// Rule name used by the tree view and in evaluation trace lines
    pub fn rule_name(self) -> &'static str {
        match self {
            BinaryOp::Or => "or_expr",
            BinaryOp::Diff => "diff_expr",
            BinaryOp::And => "and_expr",
            BinaryOp::Xor => "xor_expr",
        }
    }

    /// Combine two already-reduced operands
    pub fn apply(self, mut left: PermissionSet, right: PermissionSet) -> PermissionSet {
        match self {
            BinaryOp::Or => {
                left.extend(right);
                left
            }
            BinaryOp::Diff => {
                left.retain(|p| !right.contains(p));
                left
            }
            BinaryOp::And => {
                left.retain(|p| right.contains(p));
                left
            }
            BinaryOp::Xor => {
                for p in right {
                    if !left.remove(&p) {
                        left.insert(p);
                    }
                }
                left
            }
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
