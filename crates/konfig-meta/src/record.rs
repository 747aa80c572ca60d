//! The Konfigfile record: package identity and upstream provenance.

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use konfig_fs::NormalizedPath;

use crate::error::{Error, Result};

/// File name of the metadata record at a package root.
pub const METADATA_FILE: &str = "Konfigfile";

/// Schema identifier written into new records.
pub const API_VERSION: &str = "konfig.dev/v1alpha1";

/// `kind` value of the metadata record.
pub const KIND: &str = "Konfigfile";

/// Object identity of the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
}

/// Source type of a package's upstream. Git is the only supported type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamType {
    #[default]
    Git,
}

impl fmt::Display for UpstreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamType::Git => write!(f, "git"),
        }
    }
}

impl FromStr for UpstreamType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "git" => Ok(UpstreamType::Git),
            other => Err(Error::MissingField {
                field: format!("upstream.type (unsupported: {other})"),
            }),
        }
    }
}

/// Upstream descriptor: the version-controlled source the package tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(rename = "type")]
    pub upstream_type: UpstreamType,
    pub git: GitOrigin,
}

/// Git coordinates of the upstream subtree and the last synchronized commit.
///
/// Invariant: `commit` always denotes a commit that was, at some past sync,
/// fully materialized into the package directory (modulo local edits made
/// and committed since then).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitOrigin {
    /// Repository locator (any form git accepts, e.g. `file://...`).
    #[serde(default)]
    pub repo: String,
    /// Branch, tag, or ref the package tracks.
    #[serde(default, rename = "ref")]
    pub reference: String,
    /// Subdirectory within the upstream repository (`/` for the root).
    #[serde(default)]
    pub directory: String,
    /// Exact commit last synchronized into the package.
    #[serde(default)]
    pub commit: String,
}

/// The per-package metadata record, persisted as YAML at the package root.
///
/// Unrelated fields (`metadata`, `packageMetadata`) round-trip across an
/// update; only `upstream.git.commit` and `upstream.git.ref` change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Konfigfile {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Free-form package-level metadata, preserved verbatim.
    #[serde(default, skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub package_metadata: serde_yaml::Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<Upstream>,
}

impl Konfigfile {
    /// Create a fresh record for a package named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta { name: name.into() },
            package_metadata: serde_yaml::Mapping::new(),
            upstream: None,
        }
    }

    /// Load the record from `package_path`.
    ///
    /// A missing package directory surfaces as a filesystem error; an
    /// existing directory without a record is `NotAPackage`; malformed
    /// records fail with a descriptive parse error, never silent defaults.
    pub fn load(package_path: &NormalizedPath) -> Result<Self> {
        let native = package_path.to_native();
        if !native.exists() {
            return Err(Error::Fs(konfig_fs::Error::io(
                &native,
                io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
            )));
        }

        let record_path = package_path.join(METADATA_FILE);
        if !record_path.exists() {
            return Err(Error::NotAPackage { path: native });
        }

        let content = konfig_fs::io::read_text(&record_path)?;
        let record: Konfigfile =
            serde_yaml::from_str(&content).map_err(|e| Error::Parse {
                path: record_path.to_native(),
                message: e.to_string(),
            })?;

        if record.kind != KIND {
            return Err(Error::Parse {
                path: record_path.to_native(),
                message: format!("expected kind {KIND}, found {}", record.kind),
            });
        }

        debug!(package = %package_path, name = %record.metadata.name, "loaded Konfigfile");
        Ok(record)
    }

    /// Save the record atomically to `package_path`.
    ///
    /// A concurrent reader observes either the prior record or this one,
    /// never a partial write.
    pub fn save(&self, package_path: &NormalizedPath) -> Result<()> {
        let record_path = package_path.join(METADATA_FILE);
        let content = serde_yaml::to_string(self).map_err(|e| Error::Parse {
            path: record_path.to_native(),
            message: e.to_string(),
        })?;
        konfig_fs::io::write_atomic(&record_path, content.as_bytes())?;
        debug!(package = %package_path, "saved Konfigfile");
        Ok(())
    }

    /// The validated git upstream of this package.
    ///
    /// Every field of the origin is required for an update: without a
    /// recorded commit there is no `Original` snapshot to merge against.
    pub fn upstream_git(&self, package_path: &NormalizedPath) -> Result<&GitOrigin> {
        let upstream = self.upstream.as_ref().ok_or_else(|| Error::MissingUpstream {
            path: package_path.to_native(),
        })?;

        let git = &upstream.git;
        for (field, value) in [
            ("upstream.git.repo", &git.repo),
            ("upstream.git.ref", &git.reference),
            ("upstream.git.directory", &git.directory),
            ("upstream.git.commit", &git.commit),
        ] {
            if value.is_empty() {
                return Err(Error::MissingField {
                    field: field.to_string(),
                });
            }
        }
        Ok(git)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_record() -> Konfigfile {
        let mut record = Konfigfile::new("cockroachdb");
        record.upstream = Some(Upstream {
            upstream_type: UpstreamType::Git,
            git: GitOrigin {
                repo: "file:///upstream/repo".to_string(),
                reference: "master".to_string(),
                directory: "/".to_string(),
                commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
            },
        });
        record
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let pkg = NormalizedPath::new(dir.path());

        let record = sample_record();
        record.save(&pkg).unwrap();

        let loaded = Konfigfile::load(&pkg).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn load_missing_record_is_not_a_package() {
        let dir = tempdir().unwrap();
        let pkg = NormalizedPath::new(dir.path());

        let err = Konfigfile::load(&pkg).unwrap_err();
        assert!(matches!(err, Error::NotAPackage { .. }));
    }

    #[test]
    fn load_missing_directory_is_a_filesystem_error() {
        let dir = tempdir().unwrap();
        let pkg = NormalizedPath::new(dir.path().join("does-not-exist"));

        let err = Konfigfile::load(&pkg).unwrap_err();
        assert!(err.to_string().contains("no such file or directory"));
    }

    #[test]
    fn load_malformed_record_reports_parse_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE), "kind: [unclosed").unwrap();

        let pkg = NormalizedPath::new(dir.path());
        let err = Konfigfile::load(&pkg).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn load_rejects_wrong_kind() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(METADATA_FILE),
            "apiVersion: konfig.dev/v1alpha1\nkind: Deployment\n",
        )
        .unwrap();

        let pkg = NormalizedPath::new(dir.path());
        let err = Konfigfile::load(&pkg).unwrap_err();
        assert!(err.to_string().contains("expected kind"));
    }

    #[test]
    fn upstream_git_requires_all_fields() {
        let dir = tempdir().unwrap();
        let pkg = NormalizedPath::new(dir.path());

        let mut record = sample_record();
        record.upstream.as_mut().unwrap().git.commit = String::new();
        let err = record.upstream_git(&pkg).unwrap_err();
        assert!(err.to_string().contains("upstream.git.commit"));

        record.upstream = None;
        let err = record.upstream_git(&pkg).unwrap_err();
        assert!(matches!(err, Error::MissingUpstream { .. }));
    }

    #[test]
    fn package_metadata_round_trips_through_yaml() {
        let mut record = sample_record();
        record.package_metadata.insert(
            serde_yaml::Value::String("team".to_string()),
            serde_yaml::Value::String("platform".to_string()),
        );

        let serialized = serde_yaml::to_string(&record).unwrap();
        let parsed: Konfigfile = serde_yaml::from_str(&serialized).unwrap();
        assert_eq!(parsed, record);
        assert!(serialized.contains("packageMetadata"));
        assert!(serialized.contains("ref: master"));
    }
}
