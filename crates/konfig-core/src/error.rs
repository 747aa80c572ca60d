//! Error types for konfig-core

/// Result type for konfig-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in konfig-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] konfig_fs::Error),

    #[error("Git error: {0}")]
    Git(#[from] konfig_git::Error),

    #[error("Metadata error: {0}")]
    Meta(#[from] konfig_meta::Error),

    #[error("Merge error: {0}")]
    Merge(#[from] konfig_merge::Error),

    #[error("must commit package {path} to git before attempting to update")]
    UncommittedChanges { path: String },

    #[error("Unknown update strategy '{name}' (expected fast-forward, force-delete-replace, or resource-merge)")]
    UnknownStrategy { name: String },

    #[error("Strategy {strategy} cannot proceed: {message}")]
    StrategyPrecondition { strategy: String, message: String },

    #[error("Update aborted by merge conflicts:\n{}", .conflicts.join("\n"))]
    MergeConflict { conflicts: Vec<String> },
}
