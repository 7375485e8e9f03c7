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

//! Looking up predefined and custom roles with the `gcloud` CLI.

use std::ffi::{OsStr, OsString};
use std::process::{Command, ExitStatus};

use miette::Diagnostic;
use permcalc_core::{PermissionSet, Resolver, ResolverError, Strategy};
use smol_str::SmolStr;
use thiserror::Error;

use crate::role::{Role, RoleError};

/// The program run when no other is configured
pub const DEFAULT_GCLOUD: &str = "gcloud";

const INSTALL_HELP: &str =
    "install the gcloud CLI (https://cloud.google.com/sdk/docs/install) or pass `--gcloud`";

/// Resolves role names with `gcloud iam roles describe`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcloudResolver {
    program: OsString,
}

impl Default for GcloudResolver {
    fn default() -> Self {
        Self::new(DEFAULT_GCLOUD)
    }
}

impl GcloudResolver {
    /// Run `program` in place of `gcloud`
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The program this resolver runs
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Describe `role`, e.g. `roles/browser` or
    /// `projects/my-project/roles/custom`.
    ///
    /// See <https://cloud.google.com/sdk/gcloud/reference/iam/roles/describe>
    pub fn describe(&self, role: &str) -> Result<Role, GcloudError> {
        tracing::debug!("gcloud iam roles describe {role}");
        self.run(role).map_err(|kind| GcloudError {
            role: role.into(),
            kind,
        })
    }

    fn run(&self, role: &str) -> Result<Role, GcloudErrorKind> {
        let output = Command::new(&self.program)
            .args(["iam", "roles", "describe", role])
            .output()
            .map_err(|io| GcloudErrorKind::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                io,
            })?;
        if !output.status.success() {
            return Err(GcloudErrorKind::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
            });
        }
        let stdout = String::from_utf8(output.stdout)?;
        let value: serde_json::Value = serde_yaml::from_str(&stdout)?;
        Ok(Role::from_value(value)?)
    }
}

impl Resolver for GcloudResolver {
    fn resolve(&self, _strategy: Strategy, id: &str) -> Result<PermissionSet, ResolverError> {
        Ok(self.describe(id)?.permissions())
    }
}

/// Error describing a role with `gcloud`
#[derive(Debug, Error)]
#[error("at gcloud describe role {role}")]
pub struct GcloudError {
    role: SmolStr,
    #[source]
    kind: GcloudErrorKind,
}

impl GcloudError {
    /// The role that was being described
    pub fn role(&self) -> &str {
        &self.role
    }

    /// What went wrong
    pub fn kind(&self) -> &GcloudErrorKind {
        &self.kind
    }
}

impl Diagnostic for GcloudError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("permcalc::gcloud"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self.kind {
            GcloudErrorKind::Spawn { .. } => Some(Box::new(INSTALL_HELP)),
            _ => None,
        }
    }
}

/// Ways running `gcloud` can fail
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GcloudErrorKind {
    /// The program could not be started
    #[error("failed to run `{program}`")]
    Spawn {
        /// Program that was run
        program: String,
        /// Underlying I/O error
        #[source]
        io: std::io::Error,
    },
    /// The program exited unsuccessfully
    #[error("gcloud failed with {status}{}", stderr_note(.stderr))]
    Failed {
        /// How the program exited
        status: ExitStatus,
        /// Everything the program wrote to stderr
        stderr: String,
    },
    /// The program printed something that is not UTF-8
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
    /// The program printed something that is not YAML
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    /// The program printed YAML that does not describe a role
    #[error(transparent)]
    Role(#[from] RoleError),
}

fn stderr_note(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

impl From<GcloudError> for ResolverError {
    fn from(err: GcloudError) -> Self {
        let message = err.to_string();
        let spawn_failed = matches!(err.kind, GcloudErrorKind::Spawn { .. });
        let resolver_err = ResolverError::wrap(message, err.kind);
        if spawn_failed {
            resolver_err.with_help(INSTALL_HELP)
        } else {
            resolver_err
        }
    }
}
