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

//! Command-line front end for permcalc.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::{ExitCode, Termination};

use clap::{Parser, ValueEnum};
use miette::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use permcalc::resolve::{DefaultResolver, GcloudResolver, DEFAULT_GCLOUD};
use permcalc::{Formula, PermissionSet, TracingSink};

mod err;
pub use err::OutputError;

const LONG_ABOUT: &str = "\
Compare the permissions of multiple roles in Google Cloud.
The gcloud command (https://cloud.google.com/sdk/docs/install) is required
for named roles.

Write the comparison as a formula in the following grammar:

expr = product
  | expr \"+\" product  // or
  | expr \"-\" product  // diff
product = atom
  | product \"*\" atom  // and
  | product \"^\" atom  // xor
atom = \"@\" NAME       // Read a role from NAME file
  | NAME              // gcloud iam roles describe NAME
  | \"(\" expr \")\"
NAME: [a-zA-Z0-9_/.]+

Examples of formulas:
// Permissions of roles/browser
roles/browser
// Permissions included in roles/browser but not in roles/resourcemanager.folderViewer
roles/browser - roles/resourcemanager.folderViewer
// Permissions included in both roles/browser and roles/resourcemanager.folderViewer
roles/browser * roles/resourcemanager.folderViewer

Permissions are printed in sorted order. With `--out text` an empty result
prints nothing, while json and yaml print `[]`.

Examples of role files:
// yaml
name: roles/secretmanager.secretAccessor
includedPermissions:
- resourcemanager.projects.get
- resourcemanager.projects.list
- secretmanager.versions.access
// json
{
  \"name\": \"roles/secretmanager.secretAccessor\",
  \"includedPermissions\": [
    \"resourcemanager.projects.get\",
    \"resourcemanager.projects.list\",
    \"secretmanager.versions.access\"
  ]
}
// text
resourcemanager.projects.get
resourcemanager.projects.list
secretmanager.versions.access";

/// Set algebra over the permissions of Google Cloud IAM roles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = LONG_ABOUT)] // Pull from `Cargo.toml`
pub struct Cli {
    /// Only parse the formula and print its tree
    #[arg(long)]
    pub tree: bool,
    /// Enable debug logging, including every evaluation step
    #[arg(long)]
    pub debug: bool,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub out: OutputFormat,
    /// Program used to describe named roles
    #[arg(long, env = "PERMCALC_GCLOUD", default_value = DEFAULT_GCLOUD, value_name = "PROGRAM")]
    pub gcloud: PathBuf,
    /// The formula. Words are joined with spaces.
    #[arg(
        required = true,
        allow_hyphen_values = true,
        trailing_var_arg = true,
        value_name = "EXPR"
    )]
    pub expr: Vec<String>,
}

impl Cli {
    /// The formula, as a single string
    pub fn formula(&self) -> String {
        self.expr.join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON array
    Json,
    /// YAML list
    Yaml,
    /// One permission per line. An empty set prints nothing.
    Text,
}

#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum PermcalcExitCode {
    // The command completed successfully
    Success,
    // The formula did not parse, a role could not be resolved, or the output
    // could not be written
    Failure,
}

impl Termination for PermcalcExitCode {
    fn report(self) -> ExitCode {
        match self {
            PermcalcExitCode::Success => ExitCode::SUCCESS,
            PermcalcExitCode::Failure => ExitCode::FAILURE,
        }
    }
}

/// Send logs to stderr. `--debug` turns on every `DEBUG` event, otherwise
/// `RUST_LOG` decides and defaults to warnings only.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // a subscriber may already be set, e.g. by a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .try_init();
}

/// Print the result of `cli` to stdout, or the error report to stderr
pub fn run(cli: &Cli) -> PermcalcExitCode {
    match execute(cli) {
        Ok(out) => {
            print!("{out}");
            PermcalcExitCode::Success
        }
        Err(err) => {
            eprintln!("{err:?}");
            PermcalcExitCode::Failure
        }
    }
}

/// Everything [`run`] would print on success
pub fn execute(cli: &Cli) -> Result<String> {
    let text = cli.formula();
    tracing::debug!(formula = %text, "parsing formula");
    let formula = Formula::parse(&text).wrap_err("failed to parse formula")?;
    if cli.tree {
        return Ok(formula.tree());
    }
    let resolver = DefaultResolver::new(GcloudResolver::new(cli.gcloud.clone()));
    let permissions = if cli.debug {
        formula.evaluate_with_trace(&resolver, &TracingSink)
    } else {
        formula.evaluate(&resolver)
    }
    .wrap_err("failed to evaluate formula")?;
    Ok(render(&permissions, cli.out)?)
}

/// Format `permissions` in sorted order, ending with a newline unless there
/// is nothing to print
pub fn render(permissions: &PermissionSet, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(permissions)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(permissions)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for permission in permissions {
                out.push_str(permission);
                out.push('\n');
            }
            Ok(out)
        }
    }
}
