//! Strategy dispatch over tree snapshots.
//!
//! Strategies are pure functions from the three snapshots to an output
//! tree; the engine owns every disk effect. `fast-forward` and
//! `force-delete-replace` are tree-level; `resource-merge` lives in its
//! own module.

use konfig_fs::TreeSnapshot;
use tracing::debug;

use crate::error::{Error, Result};
use crate::request::StrategyKind;
use crate::update::report::ResourceChange;
use crate::update::resource_merge;

/// Apply `strategy` to the three snapshots, producing the output tree and
/// per-resource outcomes (empty for the tree-level strategies).
pub fn apply(
    strategy: StrategyKind,
    original: &TreeSnapshot,
    updated: &TreeSnapshot,
    local: &TreeSnapshot,
) -> Result<(TreeSnapshot, Vec<ResourceChange>)> {
    debug!(%strategy, "applying update strategy");
    match strategy {
        StrategyKind::FastForward => fast_forward(original, updated, local).map(|t| (t, Vec::new())),
        StrategyKind::ForceDeleteReplace => Ok((updated.clone(), Vec::new())),
        StrategyKind::ResourceMerge => resource_merge::merge_trees(original, updated, local),
    }
}

/// Take the new upstream tree verbatim. Refuses if the package diverged
/// from the recorded upstream state, naming the first differing file.
fn fast_forward(
    original: &TreeSnapshot,
    updated: &TreeSnapshot,
    local: &TreeSnapshot,
) -> Result<TreeSnapshot> {
    if let Some(path) = first_difference(original, local) {
        return Err(Error::StrategyPrecondition {
            strategy: StrategyKind::FastForward.to_string(),
            message: format!("package was modified since the last sync (changed: {path})"),
        });
    }
    Ok(updated.clone())
}

/// The first path (in sorted order) where the two trees disagree.
fn first_difference(a: &TreeSnapshot, b: &TreeSnapshot) -> Option<String> {
    for (path, content) in a.iter() {
        if b.get(path) != Some(content) {
            return Some(path.to_string());
        }
    }
    b.paths().find(|p| !a.contains(p)).map(str::to_string)
}
