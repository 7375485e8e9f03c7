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

//! Resolvers against real files and a stand-in `gcloud` program.

// PANIC SAFETY: tests
#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::fs;
use std::path::PathBuf;

use cool_asserts::assert_matches;
use permcalc::resolve::{
    read_role_from_file, DefaultResolver, FileResolver, FileRoleError, FormatError, GcloudResolver,
    RoleFormat,
};
use permcalc::role::RoleError;
use permcalc::{evaluate, EvaluationError, Formula, FormulaError, Resolver, Strategy};
use permcalc_core::test_utils::perms;
use rstest::rstest;
use tempfile::TempDir;

const YAML_ROLE: &str = "\
description: Allow accessing the payload of secrets.
etag: AA==
includedPermissions:
- resourcemanager.projects.get
- resourcemanager.projects.list
- secretmanager.versions.access
name: roles/secretmanager.secretAccessor
stage: GA
title: Secret Manager Secret Accessor
";

const JSON_ROLE: &str = r#"{
  "name": "roles/secretmanager.secretAccessor",
  "includedPermissions": [
    "resourcemanager.projects.get",
    "resourcemanager.projects.list",
    "secretmanager.versions.access"
  ]
}"#;

const TEXT_ROLE: &str = "\
resourcemanager.projects.get
resourcemanager.projects.list

secretmanager.versions.access
";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn accessor_permissions() -> permcalc::PermissionSet {
    perms(&[
        "resourcemanager.projects.get",
        "resourcemanager.projects.list",
        "secretmanager.versions.access",
    ])
}

#[rstest]
#[case::yaml("accessor.yaml", YAML_ROLE, "roles/secretmanager.secretAccessor")]
#[case::json("accessor.json", JSON_ROLE, "roles/secretmanager.secretAccessor")]
#[case::text("accessor.txt", TEXT_ROLE, "")]
fn reads_each_format(#[case] file: &str, #[case] contents: &str, #[case] name: &str) {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, file, contents);
    let role = read_role_from_file(&path).unwrap();
    if name.is_empty() {
        // text roles are named after their file
        assert_eq!(role.name(), path.display().to_string());
    } else {
        assert_eq!(role.name(), name);
    }
    assert_eq!(role.permissions(), accessor_permissions());
}

#[test]
fn format_is_sniffed_not_taken_from_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "role.txt", JSON_ROLE);
    let role = read_role_from_file(&path).unwrap();
    assert_eq!(role.name(), "roles/secretmanager.secretAccessor");
}

#[test]
fn malformed_file_reports_every_attempt() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.yaml", "name: roles/x\nincludedPermissions: nope\n");
    let err = read_role_from_file(&path).unwrap_err();
    assert_matches!(err, FileRoleError::NoFormatMatched { path: p, attempts } => {
        assert_eq!(p, path);
        let formats: Vec<_> = attempts.iter().map(|a| a.format()).collect();
        assert_eq!(formats, RoleFormat::ALL);
        let shown: Vec<_> = attempts.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["from yaml", "from json", "from text"]);
        assert_matches!(
            attempts[0].error(),
            FormatError::Role(RoleError::PermissionsNotStringList)
        );
        assert_matches!(attempts[1].error(), FormatError::Json(_));
        assert_matches!(
            attempts[2].error(),
            FormatError::Role(RoleError::InvalidPermissionLine { line: 1, .. })
        );
    });
}

#[test]
fn file_resolver_evaluates_formulas() {
    let dir = TempDir::new().unwrap();
    let accessor = write(&dir, "accessor.yaml", YAML_ROLE);
    let viewer = write(&dir, "viewer.txt", "resourcemanager.projects.get\nstorage.buckets.list\n");
    let formula: Formula = format!("@{} - @{}", accessor.display(), viewer.display())
        .parse()
        .unwrap();
    assert_eq!(
        formula.evaluate(&FileResolver).unwrap(),
        perms(&["resourcemanager.projects.list", "secretmanager.versions.access"])
    );
}

#[test]
fn missing_file_names_the_reference() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yaml");
    let text = format!("@{}", missing.display());
    let err = evaluate(&text, &FileResolver, None).unwrap_err();
    assert_matches!(err, FormulaError::Evaluation(EvaluationError::Resolution(err)) => {
        assert_eq!(err.strategy(), Strategy::File);
        assert_eq!(err.id(), missing.display().to_string());
    });
}

#[cfg(unix)]
mod fake_gcloud {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// A `gcloud` stand-in which prints the description stored at
    /// `dir/<role>`, or fails for unknown roles.
    fn install(dir: &TempDir) -> PathBuf {
        let roles = dir.path().join("roles");
        fs::create_dir_all(&roles).unwrap();
        fs::write(
            roles.join("browser"),
            "name: roles/browser\nincludedPermissions:\n- a.get\n- b.get\n- c.get\n- d.get\n",
        )
        .unwrap();
        fs::write(
            roles.join("folderViewer"),
            "name: roles/folderViewer\nincludedPermissions:\n- b.get\n- c.get\n- e.get\n",
        )
        .unwrap();
        fs::write(roles.join("nameless"), "includedPermissions: []\n").unwrap();
        let script = dir.path().join("gcloud");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\n\
                 [ \"$1 $2 $3\" = \"iam roles describe\" ] || exit 64\n\
                 f=\"{}/$4\"\n\
                 if [ -f \"$f\" ]; then cat \"$f\"; else echo \"ERROR: NOT_FOUND: $4\" >&2; exit 1; fi\n",
                dir.path().display()
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    fn resolver(script: &Path) -> DefaultResolver {
        DefaultResolver::new(GcloudResolver::new(script))
    }

    #[test]
    fn describes_roles() {
        let dir = TempDir::new().unwrap();
        let gcloud = GcloudResolver::new(install(&dir));
        let role = gcloud.describe("roles/browser").unwrap();
        assert_eq!(role.name(), "roles/browser");
        assert_eq!(role.permissions(), perms(&["a.get", "b.get", "c.get", "d.get"]));
    }

    #[test]
    fn set_algebra_over_gcloud_roles() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&install(&dir));
        for (text, expected) in [
            ("roles/browser - roles/folderViewer", vec!["a.get", "d.get"]),
            ("roles/browser * roles/folderViewer", vec!["b.get", "c.get"]),
            ("roles/browser ^ roles/folderViewer", vec!["a.get", "d.get", "e.get"]),
        ] {
            assert_eq!(evaluate(text, &resolver, None).unwrap(), perms(&expected), "{text}");
        }
    }

    #[test]
    fn mixes_gcloud_and_file_roles() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&install(&dir));
        let custom = write(&dir, "custom.txt", "a.get\nz.get\n");
        let text = format!("roles/browser * @{}", custom.display());
        assert_eq!(evaluate(&text, &resolver, None).unwrap(), perms(&["a.get"]));
    }

    #[test]
    fn failing_gcloud_reports_stderr() {
        let dir = TempDir::new().unwrap();
        let gcloud = GcloudResolver::new(install(&dir));
        let err = gcloud.describe("roles/unknown").unwrap_err();
        assert_eq!(err.to_string(), "at gcloud describe role roles/unknown");
        let cause = err.kind().to_string();
        assert!(cause.starts_with("gcloud failed with"), "{cause}");
        assert!(cause.ends_with(": ERROR: NOT_FOUND: roles/unknown"), "{cause}");

        let err = resolver(&install(&dir))
            .resolve(Strategy::Named, "roles/unknown")
            .unwrap_err();
        assert_eq!(err.to_string(), "at gcloud describe role roles/unknown");
    }

    #[test]
    fn invalid_description_is_a_role_error() {
        let dir = TempDir::new().unwrap();
        let gcloud = GcloudResolver::new(install(&dir));
        let err = gcloud.describe("roles/nameless").unwrap_err();
        assert_matches!(
            err.kind(),
            permcalc::resolve::GcloudErrorKind::Role(RoleError::NameNotString)
        );
    }
}
