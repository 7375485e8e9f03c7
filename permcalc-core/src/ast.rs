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

//! This module contains the AST datatypes.

mod expr;
pub use expr::*;
mod ops;
pub use ops::*;
mod pretty;

use std::collections::BTreeSet;

/// The value every formula (and every sub-formula) reduces to: a set of
/// permission strings. Iteration order is sorted, but nothing in the
/// evaluator depends on it.
pub type PermissionSet = BTreeSet<String>;
