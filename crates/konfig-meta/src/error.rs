//! Error types for konfig-meta

use std::path::PathBuf;

/// Result type for konfig-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in konfig-meta operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] konfig_fs::Error),

    #[error("{} is not a package: no Konfigfile found", .path.display())]
    NotAPackage { path: PathBuf },

    #[error("Invalid Konfigfile at {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Package {} has no upstream recorded", .path.display())]
    MissingUpstream { path: PathBuf },

    #[error("Konfigfile upstream is missing required field: {field}")]
    MissingField { field: String },
}
