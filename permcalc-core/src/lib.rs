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

//! Implementation of the permcalc formula language: a small set algebra over
//! the permissions of IAM roles.
//!
//! A formula such as `roles/browser - @viewer.yaml` is lexed and parsed into
//! an [`ast::Expr`], then reduced to a single [`PermissionSet`] by the
//! [`evaluator::Evaluator`], which asks a [`resolver::Resolver`] for the
//! permissions behind every role reference.
#![forbid(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

#[macro_use]
mod error_macros;

pub mod ast;
pub mod evaluator;
pub mod parser;
pub mod resolver;
mod stack;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use ast::{Atom, BinaryOp, Expr, ExprKind, PermissionSet, Strategy};
pub use evaluator::{
    evaluate, EvaluationError, Evaluator, FormulaError, ResolutionError, TraceEvent, TraceSink,
    TracingSink,
};
pub use parser::{parse_expr, Loc, ParseError, ParseErrorKind, Position};
pub use resolver::{Resolver, ResolverError};
