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

use miette::Diagnostic;
use thiserror::Error;

/// Failure to print a result in the requested format
#[derive(Debug, Diagnostic, Error)]
pub enum OutputError {
    /// `--out json`
    #[error("failed to render permissions as JSON")]
    #[diagnostic(code(permcalc_cli::output::json))]
    Json(#[from] serde_json::Error),
    /// `--out yaml`
    #[error("failed to render permissions as YAML")]
    #[diagnostic(code(permcalc_cli::output::yaml))]
    Yaml(#[from] serde_yaml::Error),
}
