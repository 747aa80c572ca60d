//! Error types for konfig-git

/// Result type for konfig-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in konfig-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] konfig_fs::Error),

    #[error("Failed to clone {repo}: {message}")]
    CloneFailed { repo: String, message: String },

    #[error("Unable to resolve ref '{reference}': {message}")]
    RefResolution { reference: String, message: String },

    #[error("Directory '{directory}' not found in upstream at commit {commit}")]
    DirectoryNotFound { directory: String, commit: String },
}
