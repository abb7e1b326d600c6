//! # rollmd
//!
//! **CLI Binary**
//!
//! This is the entry point for the `rollmd` command-line application.
//! It orchestrates the other crates to perform the requested actions.
//!
//! ## Responsibilities
//! * Parse command line arguments
//! * Load JSONL inputs and write receipt artifacts
//! * Dispatch commands to appropriate handlers
//! * Handle errors and exit codes
//!
//! This crate should contain minimal business logic.

mod commands;
mod jsonl;

use anyhow::Result;
use clap::Parser;
use rollmd_config::{Cli, Commands};

/// Entry point used by the `rollmd` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Rollup(args) => commands::rollup::handle(args),
        Commands::Check(args) => commands::check::handle(args),
        Commands::Completions(args) => commands::completions::handle(args),
    }
}

/// Render an error chain for stderr: the failing step first, root cause
/// last.
#[must_use]
pub fn format_error(err: &anyhow::Error) -> String {
    let mut s = format!("error: {err}");
    for cause in err.chain().skip(1) {
        s.push_str(&format!("\n  caused by: {cause}"));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_prints_the_full_chain() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = anyhow::Error::from(err).context("loading inputs");
        let rendered = format_error(&err);
        assert!(rendered.starts_with("error: loading inputs"));
        assert!(rendered.contains("caused by: missing"));
    }
}
