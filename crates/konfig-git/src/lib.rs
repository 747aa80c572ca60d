//! Git upstream collaborator for konfig
//!
//! Exposes the capability seam the update engine consumes: resolve a ref to
//! a commit, fetch an upstream subtree at a commit, and detect uncommitted
//! local changes. Any backend implementing [`UpstreamProvider`] is
//! substitutable; [`GitUpstream`] is the git2-backed implementation.

pub mod error;
pub mod provider;
pub mod upstream;

pub use error::{Error, Result};
pub use provider::UpstreamProvider;
pub use upstream::GitUpstream;
