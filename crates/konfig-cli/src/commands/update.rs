//! The `update` command.

use colored::Colorize;

use konfig_core::{StrategyKind, UpdateEngine, UpdateRequest};
use konfig_git::GitUpstream;

use crate::error::{CliError, Result};

/// Split a `PKG_PATH[@REF]` argument into path and optional ref.
///
/// Only the last `@` separates; refs never contain `@` but paths may.
pub fn split_ref(argument: &str) -> (&str, Option<&str>) {
    match argument.rsplit_once('@') {
        Some((path, reference)) if !path.is_empty() && !reference.is_empty() => {
            (path, Some(reference))
        }
        _ => (argument, None),
    }
}

pub fn run_update(package_arg: &str, strategy: &str) -> Result<()> {
    let (path, reference) = split_ref(package_arg);
    if path.is_empty() {
        return Err(CliError::user("package path must not be empty"));
    }
    let strategy: StrategyKind = strategy.parse()?;

    let mut request = UpdateRequest::new(path).with_strategy(strategy);
    if let Some(reference) = reference {
        request = request.with_reference(reference);
    }

    let engine = UpdateEngine::new(GitUpstream::new()?);
    let report = engine.update(&request)?;

    if report.unchanged {
        println!("{} {}", "unchanged".yellow().bold(), report);
    } else {
        print!("{} {}", "updated".green().bold(), report);
    }
    Ok(())
}
