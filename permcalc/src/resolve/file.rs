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

//! Reading roles from local files.

use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use permcalc_core::{PermissionSet, Resolver, ResolverError, Strategy};
use thiserror::Error;

use crate::role::{Role, RoleError};

/// Supported role file formats, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleFormat {
    /// A YAML mapping, as printed by `gcloud iam roles describe`
    Yaml,
    /// A JSON object with the same keys as the YAML form
    Json,
    /// One permission per line
    Text,
}

impl RoleFormat {
    /// Every format, in the order [`read_role_from_file`] tries them
    pub const ALL: [Self; 3] = [Self::Yaml, Self::Json, Self::Text];

    fn parse(self, path: &Path, bytes: &[u8]) -> Result<Role, FormatError> {
        match self {
            Self::Yaml => Ok(Role::from_value(serde_yaml::from_slice(bytes)?)?),
            Self::Json => Ok(Role::from_value(serde_json::from_slice(bytes)?)?),
            Self::Text => {
                let body = std::str::from_utf8(bytes)?;
                Ok(Role::from_lines(path.display().to_string(), body)?)
            }
        }
    }
}

impl Display for RoleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Why a file could not be read as one particular format
#[derive(Debug, Error)]
pub enum FormatError {
    /// Not a YAML document
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    /// Not a JSON document
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Not UTF-8 text
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
    /// Parsed, but not a valid role
    #[error(transparent)]
    Role(#[from] RoleError),
}

/// One failed attempt at reading a role file
#[derive(Debug, Error)]
#[error("from {format}")]
pub struct FormatAttemptError {
    format: RoleFormat,
    #[source]
    error: FormatError,
}

impl FormatAttemptError {
    /// The format which was tried
    pub fn format(&self) -> RoleFormat {
        self.format
    }

    /// What went wrong
    pub fn error(&self) -> &FormatError {
        &self.error
    }
}

/// Error reading a role file
#[derive(Debug, Error, Diagnostic)]
pub enum FileRoleError {
    /// The file could not be read at all
    #[error("at read role from file {}", .path.display())]
    #[diagnostic(code(permcalc::file::unreadable))]
    Unreadable {
        /// Path of the role file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        io: std::io::Error,
    },
    /// The file was read, but no format accepted it
    #[error("at read role from file {}", .path.display())]
    #[diagnostic(code(permcalc::file::no_format))]
    NoFormatMatched {
        /// Path of the role file
        path: PathBuf,
        /// One failure per format in [`RoleFormat::ALL`] order
        attempts: Vec<FormatAttemptError>,
    },
}

const FORMAT_HELP: &str = "role files are YAML or JSON with `name` and `includedPermissions`, \
or text with one permission per line";

/// Read a role from `path`, trying each of [`RoleFormat::ALL`] in turn.
/// The first format that parses wins.
pub fn read_role_from_file(path: impl AsRef<Path>) -> Result<Role, FileRoleError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|io| FileRoleError::Unreadable {
        path: path.to_owned(),
        io,
    })?;
    let mut attempts = Vec::with_capacity(RoleFormat::ALL.len());
    for format in RoleFormat::ALL {
        tracing::debug!("read role from {format} file: {}", path.display());
        match format.parse(path, &bytes) {
            Ok(role) => return Ok(role),
            Err(error) => attempts.push(FormatAttemptError { format, error }),
        }
    }
    Err(FileRoleError::NoFormatMatched {
        path: path.to_owned(),
        attempts,
    })
}

impl From<FileRoleError> for ResolverError {
    fn from(err: FileRoleError) -> Self {
        let message = err.to_string();
        match err {
            FileRoleError::Unreadable { io, .. } => ResolverError::wrap(message, io),
            FileRoleError::NoFormatMatched { attempts, .. } => ResolverError::new(message)
                .with_help(FORMAT_HELP)
                .with_related(attempts.into_iter().map(|attempt| {
                    ResolverError::wrap(attempt.to_string(), attempt.error)
                })),
        }
    }
}

/// Resolves `@path` references by reading role files
#[derive(Debug, Default, Clone, Copy)]
pub struct FileResolver;

impl Resolver for FileResolver {
    fn resolve(&self, _strategy: Strategy, id: &str) -> Result<PermissionSet, ResolverError> {
        Ok(read_role_from_file(id)?.permissions())
    }
}
