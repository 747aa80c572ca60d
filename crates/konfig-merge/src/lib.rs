//! Structural three-way merge over configuration resources
//!
//! Reconciles three snapshots of the same resource — `original` (upstream at
//! the last sync), `updated` (upstream now), and `local` (the user's copy) —
//! at the granularity of individual fields, the way git's three-way merge
//! works at the granularity of lines.

pub mod document;
pub mod error;
pub mod merge;
pub mod set;

pub use document::{ResourceDocument, ResourceKey, parse_documents, render_documents};
pub use error::{Error, Result};
pub use merge::{MergeOutcome, merge_resource};
pub use set::{ResourceEntry, ResourceSet, is_resource_path};
