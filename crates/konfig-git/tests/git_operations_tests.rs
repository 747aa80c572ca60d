//! Integration tests for the git2-backed upstream provider against real
//! git repositories.

use konfig_fs::NormalizedPath;
use konfig_git::{Error, GitUpstream, UpstreamProvider};
use konfig_test_utils::dataset::{DATASET_1, DATASET_2};
use konfig_test_utils::{UpstreamFixture, Workspace};
use pretty_assertions::assert_eq;

#[test]
fn resolve_ref_returns_head_of_branch() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let provider = GitUpstream::new().unwrap();

    let resolved = provider.resolve_ref(&upstream.url(), "master").unwrap();
    assert_eq!(resolved, upstream.head_commit());
    assert_eq!(resolved.len(), 40);
}

#[test]
fn resolve_ref_follows_branches_created_at_older_commits() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let v1_commit = upstream.head_commit();
    upstream.create_branch("v1");
    upstream.replace_dataset(DATASET_2, "upstream advances");

    let provider = GitUpstream::new().unwrap();
    assert_eq!(provider.resolve_ref(&upstream.url(), "v1").unwrap(), v1_commit);
    assert_eq!(
        provider.resolve_ref(&upstream.url(), "master").unwrap(),
        upstream.head_commit()
    );
}

#[test]
fn resolve_ref_rejects_unknown_refs() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let provider = GitUpstream::new().unwrap();

    let err = provider
        .resolve_ref(&upstream.url(), "does-not-exist")
        .unwrap_err();
    assert!(matches!(err, Error::RefResolution { .. }));
    assert!(err.to_string().contains("does-not-exist"));
}

#[test]
fn fetch_tree_at_returns_the_committed_files() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let provider = GitUpstream::new().unwrap();
    let commit = upstream.head_commit();

    let tree = provider.fetch_tree_at(&upstream.url(), &commit, "/").unwrap();

    let paths: Vec<_> = tree.paths().collect();
    assert_eq!(paths, vec!["README.md", "deployment.yaml", "service.yaml"]);
    let deployment = std::str::from_utf8(tree.get("deployment.yaml").unwrap()).unwrap();
    assert!(deployment.contains("replicas: 3"));
}

#[test]
fn fetch_tree_at_pins_to_the_commit_not_the_branch() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let v1_commit = upstream.head_commit();
    upstream.replace_dataset(DATASET_2, "upstream advances");

    let provider = GitUpstream::new().unwrap();
    let tree = provider
        .fetch_tree_at(&upstream.url(), &v1_commit, "/")
        .unwrap();

    assert!(!tree.contains("configmap.yaml"));
    let deployment = std::str::from_utf8(tree.get("deployment.yaml").unwrap()).unwrap();
    assert!(deployment.contains("nginx:1.25"));
}

#[test]
fn fetch_tree_at_restricts_to_a_subdirectory() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    upstream.commit_file(
        "packages/db/statefulset.yaml",
        "kind: StatefulSet\nmetadata:\n  name: db\n",
        "add db package",
    );

    let provider = GitUpstream::new().unwrap();
    let commit = upstream.head_commit();
    let tree = provider
        .fetch_tree_at(&upstream.url(), &commit, "/packages/db")
        .unwrap();

    let paths: Vec<_> = tree.paths().collect();
    assert_eq!(paths, vec!["statefulset.yaml"]);
}

#[test]
fn fetch_tree_at_reports_missing_subdirectory() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let provider = GitUpstream::new().unwrap();
    let commit = upstream.head_commit();

    let err = provider
        .fetch_tree_at(&upstream.url(), &commit, "/no/such/dir")
        .unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound { .. }));
}

#[test]
fn local_changes_is_false_for_a_committed_package() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let workspace = Workspace::new();
    workspace.materialize_package("frontend", &upstream);
    workspace.commit_all("fork frontend");

    let provider = GitUpstream::new().unwrap();
    let path = NormalizedPath::new(workspace.package_path("frontend"));
    assert!(!provider.local_changes(&path).unwrap());
}

#[test]
fn local_changes_detects_modified_and_untracked_files() {
    let upstream = UpstreamFixture::with_dataset(DATASET_1);
    let workspace = Workspace::new();
    workspace.materialize_package("frontend", &upstream);
    workspace.commit_all("fork frontend");

    let provider = GitUpstream::new().unwrap();
    let path = NormalizedPath::new(workspace.package_path("frontend"));

    workspace.edit_file("frontend/README.md", "edited\n");
    assert!(provider.local_changes(&path).unwrap());

    workspace.commit_all("commit the edit");
    assert!(!provider.local_changes(&path).unwrap());

    workspace.edit_file("frontend/new-file.yaml", "kind: ConfigMap\nmetadata:\n  name: x\n");
    assert!(provider.local_changes(&path).unwrap());
}

#[test]
fn local_changes_treats_non_repositories_as_changed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("file.yaml"), "kind: ConfigMap\n").unwrap();

    let provider = GitUpstream::new().unwrap();
    let path = NormalizedPath::new(dir.path());
    assert!(provider.local_changes(&path).unwrap());
}

#[test]
fn clone_failure_names_the_repository() {
    let provider = GitUpstream::new().unwrap();
    let err = provider
        .resolve_ref("file:///nonexistent/upstream/repo", "master")
        .unwrap_err();
    assert!(matches!(err, Error::CloneFailed { .. }));
    assert!(err.to_string().contains("/nonexistent/upstream/repo"));
}
