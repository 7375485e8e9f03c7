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

//! Google Cloud IAM roles, as returned by `gcloud iam roles describe` or
//! written in a role file.

use miette::Diagnostic;
use permcalc_core::PermissionSet;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A named role and the permissions it grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    name: String,
    included_permissions: Vec<String>,
}

/// Ways a role description can be malformed
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum RoleError {
    /// The role name is empty
    #[error("role has no name!")]
    #[diagnostic(code(permcalc::role::no_name))]
    NoName,
    /// `name` is missing or is not a string
    #[error("name is not a string")]
    #[diagnostic(code(permcalc::role::name))]
    NameNotString,
    /// `includedPermissions` is something other than a list of strings
    #[error("includedPermissions is not a list of string")]
    #[diagnostic(code(permcalc::role::included_permissions))]
    PermissionsNotStringList,
    /// The document is a scalar or a list rather than a mapping
    #[error("role description is not a mapping")]
    #[diagnostic(
        code(permcalc::role::not_a_mapping),
        help("a role has the keys `name` and `includedPermissions`")
    )]
    NotAMapping,
    /// A line of a text role file holds something other than one permission
    #[error("at line {line}, invalid permission line {text}")]
    #[diagnostic(
        code(permcalc::role::permission_line),
        help("text role files list one permission per line")
    )]
    InvalidPermissionLine {
        /// 1-based line number
        line: usize,
        /// The offending line, without trailing whitespace
        text: String,
    },
}

impl Role {
    /// Create a role. Fails if `name` is empty.
    pub fn new(
        name: impl Into<String>,
        included_permissions: Vec<String>,
    ) -> Result<Self, RoleError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RoleError::NoName);
        }
        Ok(Self {
            name,
            included_permissions,
        })
    }

    /// Build a role from a parsed YAML or JSON document.
    ///
    /// The document must be a mapping with a string `name`. A missing
    /// `includedPermissions` means no permissions. Other keys, such as
    /// `etag` or `stage`, are ignored.
    pub fn from_value(value: Value) -> Result<Self, RoleError> {
        let Value::Object(mut map) = value else {
            return Err(RoleError::NotAMapping);
        };
        let name = match map.remove("name") {
            Some(Value::String(name)) => name,
            _ => return Err(RoleError::NameNotString),
        };
        let included_permissions = match map.remove("includedPermissions") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(p) => Ok(p),
                    _ => Err(RoleError::PermissionsNotStringList),
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(RoleError::PermissionsNotStringList),
        };
        Self::new(name, included_permissions)
    }

    /// Build a role from a text file body: one permission per line.
    ///
    /// Trailing whitespace is dropped and blank lines are skipped. Any
    /// other line must be a single run of non-whitespace characters.
    pub fn from_lines(name: impl Into<String>, body: &str) -> Result<Self, RoleError> {
        let mut included_permissions = Vec::new();
        for (idx, line) in body.lines().enumerate() {
            let text = line.trim_end();
            if text.is_empty() {
                continue;
            }
            if text.contains(char::is_whitespace) {
                return Err(RoleError::InvalidPermissionLine {
                    line: idx + 1,
                    text: text.to_owned(),
                });
            }
            included_permissions.push(text.to_owned());
        }
        Self::new(name, included_permissions)
    }

    /// The role's name, e.g. `roles/browser`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permissions in the order they were listed, duplicates included
    pub fn included_permissions(&self) -> &[String] {
        &self.included_permissions
    }

    /// The permissions as a set
    pub fn permissions(&self) -> PermissionSet {
        self.included_permissions.iter().cloned().collect()
    }
}

impl From<Role> for PermissionSet {
    fn from(role: Role) -> Self {
        role.included_permissions.into_iter().collect()
    }
}
