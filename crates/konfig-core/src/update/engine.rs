//! The update engine: orchestrates one package update end to end.
//!
//! Pipeline: load the Konfigfile, guard on a clean git state, resolve the
//! target ref, fetch the `Original` and `Updated` snapshots, read the
//! `Local` tree, run the strategy, then apply the result atomically via a
//! staged sibling directory. The package content lands before the metadata
//! record is rewritten, so a crash between the two leaves a tree that a
//! re-run can reconcile rather than a record pointing at absent content.

use std::fs;

use konfig_fs::{NormalizedPath, TreeSnapshot, swap_directory};
use konfig_git::UpstreamProvider;
use konfig_meta::{Konfigfile, METADATA_FILE};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::request::UpdateRequest;
use crate::update::report::UpdateReport;
use crate::update::strategy;

/// Drives package updates against any [`UpstreamProvider`].
pub struct UpdateEngine<P: UpstreamProvider> {
    provider: P,
}

impl<P: UpstreamProvider> UpdateEngine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Update one package per `request`.
    ///
    /// On any error the package directory is byte-identical to its state
    /// before the call.
    pub fn update(&self, request: &UpdateRequest) -> Result<UpdateReport> {
        let package = &request.path;
        let mut record = Konfigfile::load(package)?;
        let origin = record.upstream_git(package)?.clone();

        let reference = request
            .reference
            .clone()
            .unwrap_or_else(|| origin.reference.clone());

        if self.provider.local_changes(package)? {
            return Err(Error::UncommittedChanges {
                path: package.to_string(),
            });
        }

        let new_commit = self.provider.resolve_ref(&origin.repo, &reference)?;
        info!(
            package = %package,
            %reference,
            from = %origin.commit,
            to = %new_commit,
            strategy = %request.strategy,
            "updating package"
        );

        let mut report = UpdateReport {
            package: package.to_string(),
            strategy: request.strategy,
            reference: reference.clone(),
            previous_commit: origin.commit.clone(),
            new_commit: new_commit.clone(),
            unchanged: false,
            changes: Vec::new(),
        };

        if new_commit == origin.commit {
            // Content cannot change; at most the tracked ref moves.
            if reference != origin.reference {
                if let Some(upstream) = record.upstream.as_mut() {
                    upstream.git.reference = reference;
                }
                record.save(package)?;
            }
            report.unchanged = true;
            return Ok(report);
        }

        // The metadata record is engine-owned state, never merge input;
        // an upstream that tracks its own record must not affect the
        // strategies, so it is stripped from all three snapshots.
        let mut original = self
            .provider
            .fetch_tree_at(&origin.repo, &origin.commit, &origin.directory)?;
        original.remove(METADATA_FILE);
        let mut updated = self
            .provider
            .fetch_tree_at(&origin.repo, &new_commit, &origin.directory)?;
        updated.remove(METADATA_FILE);
        let local = TreeSnapshot::read_dir(package, &[METADATA_FILE])?;

        let (output, changes) = strategy::apply(request.strategy, &original, &updated, &local)?;
        report.changes = changes;

        // Carry the current record bytes through the swap verbatim; the
        // updated record is written only after the content is in place.
        let record_bytes = konfig_fs::io::read_bytes(&package.join(METADATA_FILE))?;
        self.apply_tree(package, &output, &record_bytes)?;

        if let Some(upstream) = record.upstream.as_mut() {
            upstream.git.reference = reference;
            upstream.git.commit = new_commit;
        }
        record.save(package)?;

        info!(package = %package, "update complete");
        Ok(report)
    }

    /// Replace the package directory's contents with `output` atomically.
    fn apply_tree(
        &self,
        package: &NormalizedPath,
        output: &TreeSnapshot,
        record_bytes: &[u8],
    ) -> Result<()> {
        let name = package.file_name().unwrap_or("package");
        let staging_name = format!(".{name}.konfig-staging");
        let staging = match package.parent() {
            Some(parent) => parent.join(&staging_name),
            None => NormalizedPath::new(&staging_name),
        };

        let staging_native = staging.to_native();
        if staging_native.exists() {
            // Leftover from an interrupted run.
            fs::remove_dir_all(&staging_native)
                .map_err(|e| konfig_fs::Error::io(&staging_native, e))?;
        }
        fs::create_dir_all(&staging_native)
            .map_err(|e| konfig_fs::Error::io(&staging_native, e))?;

        let result = (|| -> Result<()> {
            output.write_to(&staging)?;
            konfig_fs::io::write_atomic(&staging.join(METADATA_FILE), record_bytes)?;
            // A package may be the root of its own repository; its .git
            // is not part of the computed tree and must ride along.
            swap_directory(&staging, package, &[".git"])?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_dir_all(&staging_native);
        } else {
            debug!(package = %package, files = output.len(), "package tree swapped in");
        }
        result
    }
}
