//! Update requests and strategy selection.

use std::fmt;
use std::str::FromStr;

use konfig_fs::NormalizedPath;

use crate::error::Error;

/// How an update reconciles upstream changes with the local package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyKind {
    /// Take the new upstream tree verbatim; refuses if the package was
    /// edited since the last sync.
    FastForward,
    /// Take the new upstream tree verbatim, discarding local edits.
    ForceDeleteReplace,
    /// Structural three-way merge of upstream and local changes.
    #[default]
    ResourceMerge,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::FastForward => "fast-forward",
            StrategyKind::ForceDeleteReplace => "force-delete-replace",
            StrategyKind::ResourceMerge => "resource-merge",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast-forward" => Ok(StrategyKind::FastForward),
            "force-delete-replace" => Ok(StrategyKind::ForceDeleteReplace),
            "resource-merge" => Ok(StrategyKind::ResourceMerge),
            other => Err(Error::UnknownStrategy {
                name: other.to_string(),
            }),
        }
    }
}

/// One update invocation against a single package.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Path to the package directory.
    pub path: NormalizedPath,
    /// Ref to update to; `None` reuses the ref recorded in the Konfigfile.
    pub reference: Option<String>,
    pub strategy: StrategyKind,
}

impl UpdateRequest {
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            reference: None,
            strategy: StrategyKind::default(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }
}
