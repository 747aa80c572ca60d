//! Local workspace fixture: a git repository packages live in.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use crate::dataset::Dataset;
use crate::upstream::UpstreamFixture;

/// A local git repository into which packages are materialized, edited, and
/// committed — the user side of the fork-customize-update flow.
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create an empty local git repository.
    ///
    /// # Panics
    /// Panics if any git operation fails; fixtures fail loudly.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Workspace: failed to create temp dir");
        let ws = Self { temp_dir };
        ws.run_git(&["init"]);
        ws.run_git(&["config", "user.email", "test@test.com"]);
        ws.run_git(&["config", "user.name", "Test User"]);
        ws.run_git(&["config", "commit.gpgsign", "false"]);
        ws
    }

    /// The workspace root path.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of the package named `name`.
    pub fn package_path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Materialize a package from the upstream's current HEAD: copy the
    /// upstream working tree into `<root>/<name>` and write a Konfigfile
    /// recording the upstream origin. Does not commit.
    pub fn materialize_package(&self, name: &str, upstream: &UpstreamFixture) {
        let dest = self.package_path(name);
        copy_tree(upstream.root(), &dest);

        let konfigfile = format!(
            r#"apiVersion: konfig.dev/v1alpha1
kind: Konfigfile
metadata:
  name: {name}
upstream:
  type: git
  git:
    repo: {repo}
    ref: master
    directory: /
    commit: {commit}
"#,
            name = name,
            repo = upstream.url(),
            commit = upstream.head_commit(),
        );
        fs::write(dest.join("Konfigfile"), konfigfile).expect("Workspace: write Konfigfile");
    }

    /// Overwrite a file inside a package without committing.
    pub fn edit_file(&self, relative: &str, content: &str) {
        let full = self.root().join(relative);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("Workspace: create parent failed");
        }
        fs::write(&full, content).expect("Workspace: write failed");
    }

    /// Stage and commit everything in the workspace.
    pub fn commit_all(&self, message: &str) {
        self.run_git(&["add", "-A"]);
        self.run_git(&["commit", "-m", message]);
    }

    /// Assert that the package named `name` contains exactly `dataset`'s
    /// files with identical contents, ignoring the Konfigfile.
    ///
    /// # Panics
    /// Panics with a descriptive message on any mismatch.
    pub fn assert_package_matches(&self, name: &str, dataset: Dataset) {
        let pkg = self.package_path(name);

        for (path, expected) in dataset {
            let full = pkg.join(path);
            let actual = fs::read_to_string(&full)
                .unwrap_or_else(|e| panic!("expected file {}: {e}", full.display()));
            assert_eq!(
                &actual, expected,
                "content mismatch in {}",
                full.display()
            );
        }

        let mut actual_files = Vec::new();
        list_files(&pkg, &pkg, &mut actual_files);
        actual_files.retain(|f| f != "Konfigfile");
        actual_files.sort();
        let mut expected_files: Vec<String> =
            dataset.iter().map(|(p, _)| p.to_string()).collect();
        expected_files.sort();
        assert_eq!(
            actual_files, expected_files,
            "package {name} file set does not match dataset"
        );
    }

    /// Assert that the file at `relative` contains `needle`.
    pub fn assert_file_contains(&self, relative: &str, needle: &str) {
        let full = self.root().join(relative);
        let content = fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("could not read {}: {e}", full.display()));
        assert!(
            content.contains(needle),
            "{} does not contain {:?}.\nActual:\n{}",
            full.display(),
            needle,
            content
        );
    }

    fn run_git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.root())
            .output()
            .unwrap_or_else(|e| panic!("Workspace: failed to run `git {args:?}`: {e}"));
        if !output.status.success() {
            panic!(
                "Workspace: `git {args:?}` failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("copy_tree: create dest failed");
    for entry in fs::read_dir(from).expect("copy_tree: read_dir failed") {
        let entry = entry.expect("copy_tree: dir entry failed");
        if entry.file_name() == ".git" {
            continue;
        }
        let dest = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &dest);
        } else {
            fs::copy(entry.path(), &dest).expect("copy_tree: copy failed");
        }
    }
}

fn list_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in fs::read_dir(dir).expect("list_files: read_dir failed") {
        let entry = entry.expect("list_files: dir entry failed");
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            list_files(root, &path, out);
        } else {
            let rel = path
                .strip_prefix(root)
                .expect("list_files: strip_prefix failed")
                .to_string_lossy()
                .replace('\\', "/");
            out.push(rel);
        }
    }
}
