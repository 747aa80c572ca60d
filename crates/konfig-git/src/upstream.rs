//! git2-backed implementation of [`UpstreamProvider`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use git2::{ObjectType, Oid, Repository, StatusOptions, build::RepoBuilder};
use tempfile::TempDir;
use tracing::debug;

use konfig_fs::checksum::compute_checksum;
use konfig_fs::{NormalizedPath, TreeSnapshot};

use crate::provider::UpstreamProvider;
use crate::{Error, Result};

/// Git upstream backed by bare clones in a per-instance cache directory.
///
/// One instance serves one update invocation: `resolve_ref` and
/// `fetch_tree_at` for the same repo URL read from a single clone, so both
/// trees come from one consistent fetch. The cache directory is removed on
/// drop. Concurrent update invocations own disjoint instances and therefore
/// disjoint caches.
pub struct GitUpstream {
    cache_root: TempDir,
    clones: RefCell<HashMap<String, PathBuf>>,
}

impl GitUpstream {
    /// Create a provider with a fresh clone cache.
    pub fn new() -> Result<Self> {
        let cache_root = TempDir::new().map_err(|e| {
            Error::Fs(konfig_fs::Error::io(std::env::temp_dir(), e))
        })?;
        Ok(Self {
            cache_root,
            clones: RefCell::new(HashMap::new()),
        })
    }

    /// Open the cached bare clone for `repo`, cloning it on first use.
    fn open_clone(&self, repo: &str) -> Result<Repository> {
        if let Some(path) = self.clones.borrow().get(repo) {
            return Ok(Repository::open_bare(path)?);
        }

        // Checksum keys the clone directory so distinct URLs never collide.
        let key = compute_checksum(repo.as_bytes());
        let clone_path = self
            .cache_root
            .path()
            .join(key.trim_start_matches("sha256:"));

        debug!(repo, path = %clone_path.display(), "cloning upstream");
        let repository = RepoBuilder::new()
            .bare(true)
            .clone(repo, &clone_path)
            .map_err(|e| Error::CloneFailed {
                repo: repo.to_string(),
                message: e.message().to_string(),
            })?;

        self.clones
            .borrow_mut()
            .insert(repo.to_string(), clone_path);
        Ok(repository)
    }
}

impl UpstreamProvider for GitUpstream {
    fn resolve_ref(&self, repo: &str, reference: &str) -> Result<String> {
        let repository = self.open_clone(repo)?;

        // The bare clone materializes only the default branch locally;
        // every other upstream branch lives under refs/remotes/origin, so
        // the short name needs the remote-tracking form as a fallback.
        let candidates = [reference.to_string(), format!("origin/{reference}")];
        let mut message = String::new();
        for candidate in &candidates {
            match repository.revparse_single(candidate) {
                Ok(object) => {
                    let commit =
                        object.peel_to_commit().map_err(|e| Error::RefResolution {
                            reference: reference.to_string(),
                            message: e.message().to_string(),
                        })?;
                    debug!(repo, reference, commit = %commit.id(), "resolved ref");
                    return Ok(commit.id().to_string());
                }
                Err(e) => message = e.message().to_string(),
            }
        }

        Err(Error::RefResolution {
            reference: reference.to_string(),
            message,
        })
    }

    fn fetch_tree_at(&self, repo: &str, commit: &str, directory: &str) -> Result<TreeSnapshot> {
        let repository = self.open_clone(repo)?;

        let oid = Oid::from_str(commit)?;
        let tree = repository.find_commit(oid)?.tree()?;

        let subdir = directory.trim_matches('/');
        let subtree = if subdir.is_empty() {
            tree
        } else {
            let entry = tree.get_path(Path::new(subdir)).map_err(|_| {
                Error::DirectoryNotFound {
                    directory: directory.to_string(),
                    commit: commit.to_string(),
                }
            })?;
            entry.to_object(&repository)?.peel_to_tree().map_err(|_| {
                Error::DirectoryNotFound {
                    directory: directory.to_string(),
                    commit: commit.to_string(),
                }
            })?
        };

        let mut snapshot = TreeSnapshot::new();
        let mut walk_error: Option<git2::Error> = None;
        subtree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                let name = entry.name().unwrap_or_default();
                match repository.find_blob(entry.id()) {
                    Ok(blob) => {
                        snapshot.insert(format!("{root}{name}"), blob.content().to_vec());
                    }
                    Err(e) => {
                        walk_error = Some(e);
                        return git2::TreeWalkResult::Abort;
                    }
                }
            }
            git2::TreeWalkResult::Ok
        })?;
        if let Some(e) = walk_error {
            return Err(Error::Git(e));
        }

        debug!(repo, commit, directory, files = snapshot.len(), "fetched upstream tree");
        Ok(snapshot)
    }

    fn local_changes(&self, package_path: &NormalizedPath) -> Result<bool> {
        let repository = match Repository::discover(package_path.to_native()) {
            Ok(r) => r,
            // No enclosing repository: nothing is committed, so everything
            // under the package counts as uncommitted.
            Err(_) => return Ok(true),
        };
        let Some(workdir) = repository.workdir() else {
            return Ok(true);
        };

        let package_abs = package_path
            .to_native()
            .canonicalize()
            .map_err(|e| konfig_fs::Error::io(package_path.to_native(), e))?;
        let workdir_abs = workdir
            .canonicalize()
            .map_err(|e| konfig_fs::Error::io(workdir, e))?;
        let relative = package_abs.strip_prefix(&workdir_abs).unwrap_or(Path::new(""));

        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        if !relative.as_os_str().is_empty() {
            options.pathspec(relative.to_string_lossy().replace('\\', "/"));
        }

        let statuses = repository.statuses(Some(&mut options))?;
        let changed = !statuses.is_empty();
        debug!(package = %package_path, changed, "checked local working state");
        Ok(changed)
    }
}
