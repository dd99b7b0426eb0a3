//! Tinta - an incremental static blog generator for markdown posts.

mod aggregate;
mod build;
mod cli;
mod config;
mod error;
mod init;
mod logger;
mod orphan;
mod post;
mod render;
mod serve;
mod stale;
mod utils;

use anyhow::{Context, Result};
use build::BuildSummary;
use clap::Parser;
use cli::{Cli, Commands};
use config::Site;
use stale::BuildState;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => init::new_site(&path),
        Commands::Build { force } => {
            let site = Site::open(Path::new("."))?;
            run_build(&site, force)
        }
        Commands::Test => {
            let site = Site::open(Path::new("."))?;
            serve::serve_site(&site)
        }
    }
}

/// Load build state, run the orchestrator and persist the state back.
fn run_build(site: &Site, force: bool) -> Result<()> {
    let state = BuildState::load(&site.state_path());
    let (summary, state) = build::build(site, force, state)?;
    state
        .store(&site.state_path())
        .with_context(|| format!("Failed to write `{}`", site.state_path().display()))?;

    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &BuildSummary) {
    if !summary.aggregates_built {
        return; // build already reported "nothing to do"
    }
    crate::log!(
        "build";
        "done: {} post(s) built, {} orphan(s) removed{}{}",
        summary.posts_built,
        summary.orphans_removed,
        if summary.full_rebuild { " (full rebuild)" } else { "" },
        if summary.posts_skipped > 0 {
            format!(", {} skipped", summary.posts_skipped)
        } else {
            String::new()
        }
    );
}
