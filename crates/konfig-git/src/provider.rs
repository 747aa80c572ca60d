//! Upstream capability trait consumed by the update engine.

use konfig_fs::{NormalizedPath, TreeSnapshot};

use crate::Result;

/// Capabilities the update engine needs from a version-control backend.
///
/// The engine never touches git plumbing directly: it asks a provider to
/// resolve refs, materialize trees, and check the local working state. Any
/// backend implementing this trait is substitutable.
pub trait UpstreamProvider {
    /// Resolve `reference` (branch, tag, or ref expression) in `repo` to a
    /// full commit hash.
    fn resolve_ref(&self, repo: &str, reference: &str) -> Result<String>;

    /// Fetch the upstream tree at `commit`, restricted to `directory`
    /// (`/` for the repository root). Paths in the returned snapshot are
    /// relative to `directory`.
    fn fetch_tree_at(&self, repo: &str, commit: &str, directory: &str) -> Result<TreeSnapshot>;

    /// Whether the local repository enclosing `package_path` has
    /// uncommitted changes (modified, staged, or untracked entries) under
    /// the package. A package outside any git repository counts as
    /// changed: there is no committed state to fall back to.
    fn local_changes(&self, package_path: &NormalizedPath) -> Result<bool>;
}
