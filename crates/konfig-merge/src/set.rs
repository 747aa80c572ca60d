//! Resource sets: indexed views of a tree snapshot's configuration documents.

use std::collections::{BTreeMap, BTreeSet};

use konfig_fs::TreeSnapshot;
use tracing::debug;

use crate::document::{ResourceDocument, ResourceKey, parse_documents};
use crate::error::{Error, Result};

/// Whether a package-relative path holds structured resources.
pub fn is_resource_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".yaml") || lower.ends_with(".yml")
}

/// One resource together with where it came from.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub document: ResourceDocument,
    /// Package-relative path of the file that declared the resource.
    pub path: String,
    /// Position among the documents of that file.
    pub index: usize,
}

/// All resources of one tree snapshot, indexed by merge key.
#[derive(Debug, Default)]
pub struct ResourceSet {
    entries: BTreeMap<ResourceKey, ResourceEntry>,
    /// Paths whose content this set owns; everything else is plain-file.
    resource_paths: BTreeSet<String>,
}

impl ResourceSet {
    /// Parse every resource file in the snapshot. YAML files that do not
    /// parse as resources (data-only values, templates, broken syntax) are
    /// not claimed; they are reconciled whole-file alongside other plain
    /// files. A merge key declared twice anywhere in the snapshot is an
    /// error.
    pub fn from_tree(tree: &TreeSnapshot) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut resource_paths = BTreeSet::new();
        for (path, bytes) in tree.iter() {
            if !is_resource_path(path) {
                continue;
            }
            let Ok(source) = std::str::from_utf8(bytes) else {
                continue;
            };
            let documents = match parse_documents(path, source) {
                Ok(documents) if !documents.is_empty() => documents,
                Ok(_) => continue,
                Err(Error::Parse { .. } | Error::InvalidResource { .. }) => continue,
                Err(e) => return Err(e),
            };
            resource_paths.insert(path.to_string());
            for (index, document) in documents.into_iter().enumerate() {
                let key = document.key()?;
                if entries.contains_key(&key) {
                    return Err(Error::DuplicateResource {
                        key: key.to_string(),
                        path: path.to_string(),
                    });
                }
                entries.insert(
                    key,
                    ResourceEntry {
                        document,
                        path: path.to_string(),
                        index,
                    },
                );
            }
        }
        debug!(resources = entries.len(), "indexed tree snapshot");
        Ok(Self {
            entries,
            resource_paths,
        })
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&ResourceEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.entries.keys()
    }

    /// Whether `path`'s content belongs to this set's resources.
    pub fn claims(&self, path: &str) -> bool {
        self.resource_paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
