//! # rollmd-config
//!
//! **Tier 4 (Configuration)**
//!
//! This crate defines the CLI arguments for `rollmd` and the mapping from
//! parsed arguments to [`RollupOptions`].
//!
//! ## What belongs here
//! * Clap `Parser`, `Args`, `Subcommand` structs
//! * Default values and enums
//!
//! ## What does NOT belong here
//! * Business logic
//! * I/O operations

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use rollmd_types::RollupOptions;
pub use rollmd_types::ScopeSelection;

/// `rollmd`: directory rollup receipts for per-file metric producers.
#[derive(Parser, Debug)]
#[command(name = "rollmd", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute rollups for one producer run and publish receipt artifacts.
    Rollup(RollupArgs),
    /// Re-check published stats rows for scope-consistency violations.
    Check(CheckArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RollupArgs {
    /// Producer run to roll up.
    #[arg(long, value_name = "RUN_ID")]
    pub run_id: String,

    /// Directory records of the layout run (JSONL).
    #[arg(long, value_name = "FILE")]
    pub dirs: PathBuf,

    /// File records of the layout run (JSONL).
    #[arg(long, value_name = "FILE")]
    pub files: PathBuf,

    /// Raw observations of the producer run (JSONL).
    #[arg(long, visible_alias = "obs", value_name = "FILE")]
    pub observations: PathBuf,

    /// Run registry extract (JSONL).
    #[arg(long, value_name = "FILE")]
    pub runs: PathBuf,

    /// Scope(s) to compute.
    #[arg(long, value_enum, default_value_t = ScopeSelection::Both)]
    pub scope: ScopeSelection,

    /// Metric to roll up. Repeatable; default is every metric in the run.
    #[arg(long = "metric", value_name = "NAME")]
    pub metrics: Vec<String>,

    /// Skip the inequality/concentration statistics.
    #[arg(long)]
    pub no_inequality: bool,

    /// Absolute tolerance for disagreeing duplicate observations.
    #[arg(long, value_name = "EPS", default_value_t = 1e-9)]
    pub duplicate_tolerance: f64,

    /// Write stats.jsonl and receipt.json into this directory.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Table format printed to stdout.
    #[arg(long, value_enum, default_value_t = TableFormat::Md)]
    pub format: TableFormat,

    /// Metric the table is ranked by (default: first rolled-up metric).
    #[arg(long, value_name = "NAME")]
    pub by: Option<String>,

    /// Number of directories shown in the table.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Exit non-zero when invariant violations are present.
    #[arg(long)]
    pub deny_violations: bool,
}

impl RollupArgs {
    /// Map CLI flags onto engine options.
    #[must_use]
    pub fn to_options(&self) -> RollupOptions {
        RollupOptions {
            scopes: self.scope,
            metrics: if self.metrics.is_empty() {
                None
            } else {
                Some(self.metrics.clone())
            },
            include_inequality: !self.no_inequality,
            duplicate_tolerance: self.duplicate_tolerance,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Published stats rows (JSONL).
    #[arg(value_name = "STATS_FILE")]
    pub stats: PathBuf,

    /// Emit the violation report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    Powershell,
    Zsh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    Md,
    Tsv,
    Json,
}
