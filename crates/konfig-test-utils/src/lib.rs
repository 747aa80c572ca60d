//! Shared test fixtures for the konfig workspace.
//!
//! [`UpstreamFixture`] scripts an upstream git repository through dataset
//! states; [`Workspace`] is a local git repository that packages are
//! materialized into. Together they reproduce the fork-customize-update
//! flow the engine is built for.

pub mod dataset;
pub mod upstream;
pub mod workspace;

pub use upstream::UpstreamFixture;
pub use workspace::Workspace;
