//! Command implementations.

mod update;

pub use update::{run_update, split_ref};
