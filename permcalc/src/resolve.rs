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

//! Resolvers which find role permissions in Google Cloud and on disk.

use permcalc_core::{PermissionSet, Resolver, ResolverError, Strategy};

use crate::role::RoleError;

mod file;
pub use file::*;
mod gcloud;
pub use gcloud::*;

/// Resolves named roles with `gcloud` and `@path` roles from files
#[derive(Debug, Clone, Default)]
pub struct DefaultResolver {
    gcloud: GcloudResolver,
    file: FileResolver,
}

impl DefaultResolver {
    /// Use `gcloud` for named roles
    pub fn new(gcloud: GcloudResolver) -> Self {
        Self {
            gcloud,
            file: FileResolver,
        }
    }
}

impl Resolver for DefaultResolver {
    fn resolve(&self, strategy: Strategy, id: &str) -> Result<PermissionSet, ResolverError> {
        tracing::debug!(%strategy, id, "resolving role");
        match strategy {
            Strategy::Named => self.gcloud.resolve(strategy, id),
            Strategy::File => self.file.resolve(strategy, id),
        }
    }
}

impl From<RoleError> for ResolverError {
    fn from(err: RoleError) -> Self {
        ResolverError::wrap(format!("invalid role: {err}"), err)
    }
}

// PANIC SAFETY: Unit Test Code
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
#[cfg(test)]
mod test {
    use super::*;
    use miette::Diagnostic;
    use std::error::Error;
    use std::io::Write;
    use tracing_test::traced_test;

    #[test]
    fn role_error_conversion_keeps_cause() {
        let err = ResolverError::from(RoleError::NoName);
        assert_eq!(err.to_string(), "invalid role: role has no name!");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("role has no name!")
        );
    }

    #[test]
    fn unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = read_role_from_file(&path).unwrap_err();
        assert!(matches!(err, FileRoleError::Unreadable { .. }));
        let err = ResolverError::from(err);
        assert!(err.related_errors().is_empty());
        assert!(err.source().is_some());
    }

    #[test]
    fn failed_formats_become_related() {
        let mut file = tempfile::Builder::new().suffix(".role").tempfile().unwrap();
        write!(file, "name: [\n").unwrap();
        let err = ResolverError::from(read_role_from_file(file.path()).unwrap_err());
        assert_eq!(
            err.to_string(),
            format!("at read role from file {}", file.path().display())
        );
        assert!(err.help().is_some());
        let related: Vec<_> = err
            .related_errors()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(related, vec!["from yaml", "from json", "from text"]);
        assert_eq!(
            err.related_errors()[2]
                .source()
                .map(ToString::to_string)
                .as_deref(),
            Some("at line 1, invalid permission line name: [")
        );
    }

    #[test]
    #[traced_test]
    fn file_reads_are_logged_per_format() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "a.b.c\n").unwrap();
        let role = read_role_from_file(file.path()).unwrap();
        assert_eq!(role.included_permissions(), ["a.b.c"]);
        let shown = file.path().display().to_string();
        assert!(logs_contain(&format!("read role from yaml file: {shown}")));
        assert!(logs_contain(&format!("read role from text file: {shown}")));
    }

    #[test]
    #[traced_test]
    fn default_resolver_logs_each_lookup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a.b.c\n").unwrap();
        let id = file.path().to_str().unwrap();
        let resolver = DefaultResolver::default();
        resolver.resolve(Strategy::File, id).unwrap();
        resolver.resolve(Strategy::File, id).unwrap();
        assert!(logs_contain("resolving role"));
        assert!(logs_contain("strategy=file"));
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|l| l.contains("resolving role")).count() {
                2 => Ok(()),
                n => Err(format!("expected 2 lookups, saw {n}")),
            }
        });
    }

    #[test]
    fn gcloud_spawn_failure_has_help() {
        let resolver = GcloudResolver::new("permcalc-test-no-such-program");
        let err = resolver.describe("roles/browser").unwrap_err();
        assert_eq!(err.role(), "roles/browser");
        assert!(matches!(err.kind(), GcloudErrorKind::Spawn { .. }));
        assert_eq!(err.to_string(), "at gcloud describe role roles/browser");
        assert!(err.help().is_some());
        let err = ResolverError::from(err);
        assert!(err.help().is_some());
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("failed to run `permcalc-test-no-such-program`")
        );
    }
}
