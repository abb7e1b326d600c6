//! Handler for the `rollmd rollup` command.

use anyhow::{Context, Result};
use rollmd_config as cli;
use rollmd_core::{RollupOutcome, RunInputs, rollup_workflow};
use rollmd_format as format;
use rollmd_types::Scope;

use crate::commands::EXIT_VIOLATIONS;
use crate::jsonl;

pub(crate) fn handle(args: cli::RollupArgs) -> Result<()> {
    // Bulk load: the only input I/O of the whole run.
    let inputs = RunInputs {
        run_id: args.run_id.clone(),
        registry: jsonl::read_jsonl(&args.runs)?,
        directories: jsonl::read_jsonl(&args.dirs)?,
        files: jsonl::read_jsonl(&args.files)?,
        observations: jsonl::read_jsonl(&args.observations)?,
    };
    let options = args.to_options();

    let outcome = rollup_workflow(&inputs, &options)?;

    // Bulk publish. Reaching this point means the run succeeded; a fatal
    // error above leaves the output directory untouched.
    if let Some(out) = &args.out {
        std::fs::create_dir_all(out)
            .with_context(|| format!("creating output directory {}", out.display()))?;
        jsonl::write_jsonl(&out.join("stats.jsonl"), &outcome.rows)?;
        let receipt = serde_json::to_string_pretty(&outcome.receipt)?;
        std::fs::write(out.join("receipt.json"), receipt + "\n")
            .with_context(|| format!("writing receipt into {}", out.display()))?;
    }

    render(&args, &outcome)?;
    eprintln!("{}", format::summary_line(&outcome.receipt));

    if args.deny_violations && !outcome.receipt.diagnostics.violations.is_empty() {
        std::process::exit(EXIT_VIOLATIONS);
    }
    Ok(())
}

fn render(args: &cli::RollupArgs, outcome: &RollupOutcome) -> Result<()> {
    match args.format {
        cli::TableFormat::Md => {
            let Some(metric) = args
                .by
                .clone()
                .or_else(|| outcome.receipt.metrics.first().cloned())
            else {
                return Ok(());
            };
            let scope = if args.to_options().scopes.includes(Scope::Recursive) {
                Scope::Recursive
            } else {
                Scope::Direct
            };
            print!("{}", format::render_md(&outcome.rows, scope, &metric, args.top));
        }
        cli::TableFormat::Tsv => {
            print!("{}", format::render_tsv(&outcome.rows));
        }
        cli::TableFormat::Json => {
            println!("{}", serde_json::to_string(&outcome.receipt)?);
        }
    }
    Ok(())
}
