//! In-memory file tree snapshots
//!
//! A [`TreeSnapshot`] is the unit the update engine computes with: the
//! upstream tree at a commit, or the package's current on-disk state. It is
//! constructed fresh per operation and never persisted; the engine writes a
//! finished snapshot to a staging directory and swaps it in as a whole.

use std::collections::BTreeMap;
use std::fs;

use crate::{Error, NormalizedPath, Result};

/// An ordered map of relative forward-slash paths to file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    files: BTreeMap<String, Vec<u8>>,
}

impl TreeSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file at a relative path, replacing any previous content.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Remove a file, returning its content if present.
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Content of the file at `path`, if present.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Whether the snapshot contains `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Relative paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Iterate over (path, content) pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the snapshot holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Read a directory tree from disk.
    ///
    /// `.git` directories are always skipped; `exclude_root` names
    /// (e.g. the package's metadata record) are skipped at the root level
    /// only. Keys are forward-slash paths relative to `root`.
    pub fn read_dir(root: &NormalizedPath, exclude_root: &[&str]) -> Result<Self> {
        let native = root.to_native();
        if !native.is_dir() {
            return Err(Error::NotADirectory { path: native });
        }

        let mut snapshot = Self::new();
        collect_files(root, "", exclude_root, &mut snapshot)?;
        Ok(snapshot)
    }

    /// Write every file in the snapshot under `root`, creating parent
    /// directories as needed. Does not remove files absent from the
    /// snapshot; callers that need full replacement stage into an empty
    /// directory and use [`swap_directory`].
    pub fn write_to(&self, root: &NormalizedPath) -> Result<()> {
        for (path, content) in &self.files {
            let target = root.join(path);
            let native = target.to_native();
            if let Some(parent) = native.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::write(&native, content).map_err(|e| Error::io(&native, e))?;
        }
        Ok(())
    }
}

fn collect_files(
    root: &NormalizedPath,
    prefix: &str,
    exclude_root: &[&str],
    snapshot: &mut TreeSnapshot,
) -> Result<()> {
    let dir = root.join(prefix).to_native();
    let entries = fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let rel = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };

        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            if name == ".git" {
                continue;
            }
            collect_files(root, &rel, exclude_root, snapshot)?;
        } else if file_type.is_file() {
            if prefix.is_empty() && exclude_root.contains(&name.as_str()) {
                continue;
            }
            let content = fs::read(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            snapshot.insert(rel, content);
        }
        // Symlinks are skipped: package trees hold plain config files.
    }
    Ok(())
}

/// Replace `target`'s contents with `staging`'s by directory rename.
///
/// `staging` must live on the same filesystem as `target` (the engine
/// stages as a sibling directory). Root entries named in `preserve` that
/// exist in `target` but not in `staging` are carried over; the target may
/// be the root of its own git repository, whose `.git` must survive the
/// swap. On success `staging` is gone and `target` holds its contents; on
/// failure `target` is restored.
pub fn swap_directory(
    staging: &NormalizedPath,
    target: &NormalizedPath,
    preserve: &[&str],
) -> Result<()> {
    let target_native = target.to_native();
    let staging_native = staging.to_native();

    let backup_name = format!(
        ".{}.konfig-old",
        target_native
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    );
    let backup = target_native.with_file_name(&backup_name);

    fs::rename(&target_native, &backup).map_err(|e| Error::io(&target_native, e))?;

    if let Err(e) = fs::rename(&staging_native, &target_native) {
        // Put the original tree back before surfacing the error.
        let _ = fs::rename(&backup, &target_native);
        return Err(Error::io(&staging_native, e));
    }

    // Preserved entries are carried over only once both renames have
    // succeeded; the backup is not deleted if a carry-over fails.
    for name in preserve {
        let kept = backup.join(name);
        let dest = target_native.join(name);
        if kept.exists() && !dest.exists() {
            fs::rename(&kept, &dest).map_err(|e| Error::io(&kept, e))?;
        }
    }

    fs::remove_dir_all(&backup).map_err(|e| Error::io(&backup, e))?;
    Ok(())
}
