//! # rollmd-core
//!
//! This crate is the **primary library interface** for `rollmd`.
//! It coordinates tree resolution, run correlation, extraction,
//! aggregation and validation to produce rollup receipts.
//!
//! If you are embedding `rollmd` into another Rust application, depend on
//! this crate and `rollmd-types`. Avoid depending on `rollmd-aggregate` or
//! `rollmd-tree` directly unless necessary.
//!
//! The workflow is all-or-nothing per run: a fatal error anywhere before
//! the end returns `Err` and nothing else; no partial row set ever
//! escapes. Non-fatal findings (in-tolerance duplicates, invariant
//! violations) ride home in the receipt's diagnostics instead.
//!
//! Runs share no mutable state. Distinct runs can be processed in
//! parallel by the caller; within one run the resolved tree and the value
//! tables are read-only after construction, and the workflow itself
//! performs no I/O between the initial bulk load and the final publish.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

// Re-export types for convenience
pub use rollmd_types as types;

use rollmd_aggregate::{effective_metrics, rollup_run};
use rollmd_correlate::RunRegistry;
use rollmd_extract::normalize;
use rollmd_tree::DirTree;
use rollmd_types::{
    Diagnostics, DirectoryRecord, FileRecord, Observation, RollupArgsMeta, RollupOptions,
    RollupReceipt, RunRecord, RunStatus, StatsRow, ToolInfo,
};
use rollmd_validate::validate_rows;

/// Everything one rollup run consumes, loaded up front. All inputs are
/// immutable for the duration of the run; the workflow performs no I/O.
#[derive(Debug, Clone)]
pub struct RunInputs {
    /// The producer run being rolled up.
    pub run_id: String,
    /// Run registry extract covering at least this run's collection.
    pub registry: Vec<RunRecord>,
    /// Directory set of the correlated layout run.
    pub directories: Vec<DirectoryRecord>,
    /// File set of the correlated layout run.
    pub files: Vec<FileRecord>,
    /// Raw observations of the producer run.
    pub observations: Vec<Observation>,
}

/// A completed run: the receipt envelope plus every published row.
#[derive(Debug, Clone)]
pub struct RollupOutcome {
    pub receipt: RollupReceipt,
    pub rows: Vec<StatsRow>,
}

/// Runs the complete rollup workflow:
/// Resolve -> Correlate -> Extract -> Aggregate -> Validate -> Receipt.
pub fn rollup_workflow(inputs: &RunInputs, options: &RollupOptions) -> Result<RollupOutcome> {
    // 1. Resolve the canonical tree. Must complete (and become immutable)
    //    before any aggregation starts.
    let tree = DirTree::resolve(&inputs.directories).context("resolving directory tree")?;
    let file_dirs = tree
        .attach_files(&inputs.files)
        .context("attaching files to directories")?;

    // 2. Correlate the producer run with its tree-defining layout run.
    let registry = RunRegistry::new(inputs.registry.clone());
    let correlation = registry
        .correlate(&inputs.run_id)
        .context("correlating run with layout run")?;

    // 3. Extract: one value per (file, metric), nulls dropped.
    let extracted = normalize(&inputs.observations, options.duplicate_tolerance)
        .context("normalizing observations")?;

    // 4. + 5. Aggregate both scopes and assemble the stats vectors.
    let rows = rollup_run(
        &inputs.run_id,
        &tree,
        &file_dirs,
        &extracted.metrics,
        options,
    )
    .context("aggregating rollups")?;

    // 6. Validate the direct/recursive relationship. Violations are
    //    diagnostics, not errors.
    let violations = validate_rows(&rows);

    // 7. Receipt construction.
    let receipt = RollupReceipt {
        schema_version: rollmd_types::SCHEMA_VERSION,
        generated_at_ms: now_ms(),
        tool: ToolInfo::current(),
        status: RunStatus::Published,
        run_id: correlation.run_id,
        layout_run_id: correlation.layout_run_id,
        collection_id: correlation.collection_id,
        args: RollupArgsMeta {
            scopes: options.scopes,
            include_inequality: options.include_inequality,
            duplicate_tolerance: options.duplicate_tolerance,
        },
        metrics: effective_metrics(&extracted.metrics, options),
        row_count: rows.len(),
        diagnostics: Diagnostics {
            duplicate_notes: extracted.duplicate_notes,
            violations,
        },
    };

    Ok(RollupOutcome { receipt, rows })
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
