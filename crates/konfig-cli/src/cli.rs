//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// konfig - update git-sourced configuration packages
#[derive(Parser, Debug)]
#[command(name = "konfig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Update a package to a newer upstream ref
    ///
    /// Examples:
    ///   konfig update my-pkg                       # re-sync the recorded ref
    ///   konfig update my-pkg@v2.0.1                # update to a tag
    ///   konfig update my-pkg --strategy fast-forward
    Update {
        /// Package directory, optionally suffixed with @REF
        ///
        /// With no @REF the ref recorded in the package's Konfigfile is
        /// re-resolved (picking up new commits on a tracked branch).
        #[arg(value_name = "PKG_PATH[@REF]")]
        package: String,

        /// Update strategy: fast-forward, force-delete-replace, or
        /// resource-merge
        #[arg(long, default_value = "resource-merge")]
        strategy: String,
    },
}
