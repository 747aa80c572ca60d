//! Error types for konfig-merge

/// Result type for konfig-merge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in konfig-merge operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse YAML in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid resource in {path}: {reason}")]
    InvalidResource { path: String, reason: String },

    #[error("Duplicate resource {key}: declared again in {path}")]
    DuplicateResource { key: String, path: String },

    #[error("Failed to render merged resources: {message}")]
    Render { message: String },
}
