//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tinta static blog generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new blog site at the given path
    Init {
        /// Path for the new site directory
        path: PathBuf,
    },

    /// Build the site, regenerating only pages that are out of date
    Build {
        /// Rebuild every page regardless of timestamps
        #[arg(long)]
        force: bool,
    },

    /// Serve the generated site locally for previewing
    Test,
}

#[allow(unused)]
impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_test(&self) -> bool {
        matches!(self.command, Commands::Test)
    }
}
