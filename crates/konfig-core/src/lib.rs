//! Update engine for git-sourced configuration packages
//!
//! A package is a directory of configuration files materialized from a
//! subtree of an upstream git repository, plus a `Konfigfile` recording
//! where it came from. The engine advances a package to a newer upstream
//! commit under one of three strategies, applying the result to disk
//! all-or-nothing.

pub mod error;
pub mod request;
pub mod update;

pub use error::{Error, Result};
pub use request::{StrategyKind, UpdateRequest};
pub use update::engine::UpdateEngine;
pub use update::report::{ResourceChange, UpdateReport};
