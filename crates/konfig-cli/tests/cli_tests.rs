//! End-to-end tests of the `konfig` binary.

use assert_cmd::Command;
use konfig_test_utils::dataset::{DATASET_1, DATASET_2};
use konfig_test_utils::{UpstreamFixture, Workspace};
use predicates::prelude::*;

fn konfig() -> Command {
    Command::cargo_bin("konfig").expect("konfig binary builds")
}

#[test]
fn no_command_prints_the_help_hint() {
    konfig()
        .assert()
        .success()
        .stdout(predicate::str::contains("konfig --help"));
}

#[test]
fn update_requires_exactly_one_package_argument() {
    konfig()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PKG_PATH"));

    konfig()
        .args(["update", "one", "two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn unknown_strategy_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    konfig()
        .args(["update", dir.path().to_str().unwrap(), "--strategy", "rebase"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown update strategy 'rebase'"));
}

#[test]
fn empty_package_path_is_a_usage_error() {
    konfig()
        .args(["update", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package path must not be empty"));
}

#[test]
fn missing_package_path_fails_with_an_error() {
    konfig()
        .args(["update", "/no/such/package"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn directory_without_a_konfigfile_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("deployment.yaml"), "kind: Deployment\n").unwrap();

    konfig()
        .args(["update", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a package"));
}

#[test]
fn update_advances_a_committed_package() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let workspace = Workspace::new();
    workspace.materialize_package("frontend", &upstream);
    workspace.commit_all("fork frontend");
    upstream.replace_dataset(DATASET_2, "upstream advances");

    konfig()
        .args(["update", workspace.package_path("frontend").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    workspace.assert_file_contains("frontend/deployment.yaml", "nginx:1.27");
    workspace.assert_file_contains("frontend/configmap.yaml", "mode: production");
}

#[test]
fn update_at_head_reports_unchanged() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let workspace = Workspace::new();
    workspace.materialize_package("frontend", &upstream);
    workspace.commit_all("fork frontend");

    konfig()
        .args(["update", workspace.package_path("frontend").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("already up to date"));
}

#[test]
fn uncommitted_package_update_is_refused() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let workspace = Workspace::new();
    workspace.materialize_package("frontend", &upstream);
    // No commit.
    upstream.replace_dataset(DATASET_2, "upstream advances");

    konfig()
        .args(["update", workspace.package_path("frontend").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must commit package"));
}

#[test]
fn update_accepts_a_ref_suffix() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let workspace = Workspace::new();
    workspace.materialize_package("frontend", &upstream);
    workspace.commit_all("fork frontend");
    upstream.replace_dataset(DATASET_2, "upstream advances");
    upstream.create_branch("v2");

    let argument = format!("{}@v2", workspace.package_path("frontend").display());
    konfig()
        .args(["update", &argument, "--strategy", "fast-forward"])
        .assert()
        .success();

    workspace.assert_file_contains("frontend/Konfigfile", "ref: v2");
    workspace.assert_file_contains("frontend/deployment.yaml", "nginx:1.27");
}
