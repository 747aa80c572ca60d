//! Update reports returned to callers.

use std::fmt;

use crate::request::StrategyKind;

/// What happened to one resource during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    /// Display form of the resource's merge key, e.g. `Deployment web/frontend`.
    pub resource: String,
    /// Display form of the merge outcome, e.g. `merged` or `kept-local`.
    pub outcome: String,
}

/// Summary of one completed update.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub package: String,
    pub strategy: StrategyKind,
    pub reference: String,
    pub previous_commit: String,
    pub new_commit: String,
    /// The resolved commit equals the recorded one; nothing was written.
    pub unchanged: bool,
    /// Per-resource outcomes; only resource-merge populates this.
    pub changes: Vec<ResourceChange>,
}

impl UpdateReport {
    fn short(commit: &str) -> &str {
        &commit[..commit.len().min(12)]
    }
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchanged {
            return write!(
                f,
                "{} is already up to date at {} ({})",
                self.package,
                self.reference,
                Self::short(&self.new_commit)
            );
        }
        writeln!(
            f,
            "updated {} to {} ({} -> {}) using {}",
            self.package,
            self.reference,
            Self::short(&self.previous_commit),
            Self::short(&self.new_commit),
            self.strategy
        )?;
        for change in &self.changes {
            writeln!(f, "  {}: {}", change.resource, change.outcome)?;
        }
        Ok(())
    }
}
