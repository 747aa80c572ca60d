//! The update pipeline: guard, fetch, reconcile, apply.

pub mod engine;
pub mod report;
pub mod resource_merge;
pub mod strategy;
