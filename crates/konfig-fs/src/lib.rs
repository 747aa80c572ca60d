//! Filesystem layer for konfig
//!
//! Provides normalized path handling, atomic file I/O, checksums, and the
//! [`TreeSnapshot`] representation of a package's file tree that the update
//! engine computes into and swaps onto disk as a unit.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;
pub mod snapshot;

pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use snapshot::{TreeSnapshot, swap_directory};
