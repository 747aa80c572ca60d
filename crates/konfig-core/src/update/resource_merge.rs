//! The resource-merge strategy: structural three-way reconciliation.
//!
//! Resource files are reconciled per resource at field granularity; other
//! files (scripts, docs) are reconciled whole-file. Any conflict aborts the
//! update before a single byte reaches the package directory.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use konfig_fs::TreeSnapshot;
use konfig_merge::{
    MergeOutcome, ResourceDocument, ResourceKey, ResourceSet, merge_resource, parse_documents,
    render_documents,
};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::update::report::ResourceChange;

pub fn merge_trees(
    original: &TreeSnapshot,
    updated: &TreeSnapshot,
    local: &TreeSnapshot,
) -> Result<(TreeSnapshot, Vec<ResourceChange>)> {
    let original_set = ResourceSet::from_tree(original)?;
    let updated_set = ResourceSet::from_tree(updated)?;
    let local_set = ResourceSet::from_tree(local)?;

    let mut keys: BTreeSet<&ResourceKey> = BTreeSet::new();
    keys.extend(original_set.keys());
    keys.extend(updated_set.keys());
    keys.extend(local_set.keys());

    let mut conflicts = Vec::new();
    let mut changes = Vec::new();
    // Merged documents grouped by target file, ordered by source position.
    let mut files: BTreeMap<String, Vec<(usize, ResourceDocument)>> = BTreeMap::new();

    for key in keys {
        let original_entry = original_set.get(key);
        let updated_entry = updated_set.get(key);
        let local_entry = local_set.get(key);

        let (merged, outcome) = merge_resource(
            original_entry.map(|e| e.document.value()),
            updated_entry.map(|e| e.document.value()),
            local_entry.map(|e| e.document.value()),
        );

        if let MergeOutcome::Conflict(fields) = &outcome {
            conflicts.push(format!("{key}: {}", fields.join(", ")));
            continue;
        }
        changes.push(ResourceChange {
            resource: key.to_string(),
            outcome: outcome.to_string(),
        });

        if let Some(value) = merged {
            // The updated snapshot decides where the resource lives; new
            // local resources keep their local placement.
            let placement = updated_entry.or(local_entry).or(original_entry);
            if let Some(entry) = placement {
                let document = ResourceDocument::new(value, &entry.path)?;
                files
                    .entry(entry.path.clone())
                    .or_default()
                    .push((entry.index, document));
            }
        }
    }

    let mut output = merge_plain_files(
        (original, &original_set),
        (updated, &updated_set),
        (local, &local_set),
        &mut conflicts,
    );

    if !conflicts.is_empty() {
        info!(count = conflicts.len(), "resource merge aborted by conflicts");
        return Err(Error::MergeConflict { conflicts });
    }

    for (path, mut documents) in files {
        documents.sort_by_key(|(index, _)| *index);
        let documents: Vec<ResourceDocument> =
            documents.into_iter().map(|(_, doc)| doc).collect();

        // When the merged documents equal one side's file verbatim, keep
        // that side's bytes so untouched files retain their formatting.
        if let Some(bytes) = unchanged_source(&path, &documents, &[local, updated]) {
            output.insert(path, bytes);
            continue;
        }

        let rendered = render_documents(&documents)?;
        output.insert(path, rendered.into_bytes());
    }

    debug!(files = output.len(), resources = changes.len(), "merge assembled");
    Ok((output, changes))
}

/// The raw bytes of the first tree whose copy of `path` parses to exactly
/// the merged documents, if any.
fn unchanged_source(
    path: &str,
    documents: &[ResourceDocument],
    trees: &[&TreeSnapshot],
) -> Option<Vec<u8>> {
    for tree in trees {
        let Some(bytes) = tree.get(path) else { continue };
        let Ok(source) = std::str::from_utf8(bytes) else { continue };
        if let Ok(parsed) = parse_documents(path, source) {
            if parsed == documents {
                return Some(bytes.to_vec());
            }
        }
    }
    None
}

/// Whole-file three-way merge for every path not claimed as resource
/// content in its own snapshot: docs, scripts, and YAML that does not
/// parse as resources (data-only values files, templates).
fn merge_plain_files(
    original: (&TreeSnapshot, &ResourceSet),
    updated: (&TreeSnapshot, &ResourceSet),
    local: (&TreeSnapshot, &ResourceSet),
    conflicts: &mut Vec<String>,
) -> TreeSnapshot {
    let (original, original_set) = original;
    let (updated, updated_set) = updated;
    let (local, local_set) = local;

    let mut paths: BTreeSet<&str> = BTreeSet::new();
    paths.extend(original.paths().filter(|p| !original_set.claims(p)));
    paths.extend(updated.paths().filter(|p| !updated_set.claims(p)));
    paths.extend(local.paths().filter(|p| !local_set.claims(p)));

    let mut output = TreeSnapshot::new();
    for path in paths {
        let o = original.get(path);
        let u = updated.get(path);
        let l = local.get(path);

        let merged = if u == o {
            l
        } else if l == o || l == u {
            u
        } else {
            conflicts.push(format!("{path}: conflicting file edits"));
            continue;
        };
        if let Some(content) = merged {
            output.insert(path.to_string(), content.to_vec());
        }
    }
    output
}
