//! Handler for the `rollmd check` command: re-validate published rows.

use anyhow::Result;
use rollmd_config as cli;
use rollmd_types::StatsRow;
use rollmd_validate::validate_rows;

use crate::commands::EXIT_VIOLATIONS;
use crate::jsonl;

pub(crate) fn handle(args: cli::CheckArgs) -> Result<()> {
    let rows: Vec<StatsRow> = jsonl::read_jsonl(&args.stats)?;
    let violations = validate_rows(&rows);

    if args.json {
        println!("{}", serde_json::to_string(&violations)?);
    } else if violations.is_empty() {
        println!("ok: {} rows, no violations", rows.len());
    } else {
        for v in &violations {
            println!(
                "{}: {} {} (direct {}, recursive {})",
                v.kind.as_str(),
                v.dir_path,
                v.metric,
                v.direct_value,
                v.recursive_value
            );
        }
    }

    if !violations.is_empty() {
        std::process::exit(EXIT_VIOLATIONS);
    }
    Ok(())
}
