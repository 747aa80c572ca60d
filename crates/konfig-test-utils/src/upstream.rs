//! Scripted upstream git repository fixture.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use crate::dataset::Dataset;

/// An upstream git repository whose working tree can be replaced with a
/// dataset and committed, simulating upstream advancing between package
/// syncs.
///
/// The default branch is always `master`.
pub struct UpstreamFixture {
    temp_dir: TempDir,
}

impl UpstreamFixture {
    /// Initialise an upstream repository with `dataset` committed on
    /// `master`.
    ///
    /// # Panics
    /// Panics if any git operation fails; fixtures fail loudly.
    pub fn with_dataset(dataset: Dataset) -> Self {
        let temp_dir = TempDir::new().expect("UpstreamFixture: failed to create temp dir");
        let fixture = Self { temp_dir };

        fixture.run_git(&["init"]);
        fixture.run_git(&["config", "user.email", "test@test.com"]);
        fixture.run_git(&["config", "user.name", "Test User"]);
        fixture.run_git(&["config", "commit.gpgsign", "false"]);

        fixture.write_files(dataset);
        fixture.run_git(&["add", "."]);
        fixture.run_git(&["commit", "-m", "initial dataset"]);
        fixture.run_git(&["branch", "-M", "master"]);
        fixture
    }

    /// The repository's root path.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `file://` URL usable as an upstream repo locator.
    pub fn url(&self) -> String {
        format!("file://{}", self.root().display())
    }

    /// Replace the entire working tree with `dataset` and commit.
    pub fn replace_dataset(&self, dataset: Dataset, message: &str) {
        for entry in fs::read_dir(self.root()).expect("UpstreamFixture: read_dir failed") {
            let entry = entry.expect("UpstreamFixture: dir entry failed");
            if entry.file_name() == ".git" {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                fs::remove_dir_all(&path).expect("UpstreamFixture: remove dir failed");
            } else {
                fs::remove_file(&path).expect("UpstreamFixture: remove file failed");
            }
        }
        self.write_files(dataset);
        self.run_git(&["add", "-A"]);
        self.run_git(&["commit", "-m", message]);
    }

    /// Write or overwrite a single file and commit it.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("UpstreamFixture: create parent failed");
        }
        fs::write(&full, content).expect("UpstreamFixture: write failed");
        self.run_git(&["add", path]);
        self.run_git(&["commit", "-m", message]);
    }

    /// Create a branch at the current HEAD.
    pub fn create_branch(&self, name: &str) {
        self.run_git(&["branch", name]);
    }

    /// The full hash of the current HEAD commit.
    pub fn head_commit(&self) -> String {
        let repo = git2::Repository::open(self.root())
            .expect("UpstreamFixture: failed to open repository");
        let head = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("UpstreamFixture: failed to resolve HEAD");
        head.id().to_string()
    }

    fn write_files(&self, dataset: Dataset) {
        for (path, content) in dataset {
            let full = self.root().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("UpstreamFixture: create parent failed");
            }
            fs::write(&full, content).expect("UpstreamFixture: write failed");
        }
    }

    fn run_git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.root())
            .output()
            .unwrap_or_else(|e| panic!("UpstreamFixture: failed to run `git {args:?}`: {e}"));
        if !output.status.success() {
            panic!(
                "UpstreamFixture: `git {args:?}` failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}
