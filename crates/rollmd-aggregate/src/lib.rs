//! # rollmd-aggregate
//!
//! **Tier 2 (Rollup Engine)**
//!
//! Turns normalized per-file values into per-directory stats rows in two
//! scopes. Direct rollups group values by the file's immediate directory.
//! Recursive rollups are a bottom-up accumulation over the depth buckets
//! of the tree: each directory's value set is its own direct values plus
//! the already-accumulated sets of its children, moved one level up per
//! step. No directory's subtree is ever re-walked, so total work stays
//! proportional to the value volume, not the square of it.
//!
//! Every directory known to the tree gets a row for every requested
//! metric in every requested scope, even with zero qualifying files
//! (count 0, all other fields null): "no data" must stay distinguishable
//! from "not computed".
//!
//! ## What belongs here
//! * Direct and recursive value grouping
//! * The depth-leveled bottom-up pass
//! * Stats-vector assembly ([`stats::distribution`])
//!
//! ## What does NOT belong here
//! * Tree validation, run correlation, observation dedup
//! * Output rendering or I/O

pub mod stats;

use std::collections::{BTreeMap, BTreeSet};

use rollmd_extract::NormalizedMetrics;
use rollmd_tree::DirTree;
use rollmd_types::{RollupOptions, Scope, StatsRow};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("observation references file {file_id} unknown to the layout run (metric {metric})")]
    UnknownFile { file_id: String, metric: String },
}

/// The metric names this invocation will publish rows for: the explicit
/// filter when one was given, otherwise every metric present in the run.
/// Always sorted ascending, always deduplicated.
#[must_use]
pub fn effective_metrics(metrics: &NormalizedMetrics, options: &RollupOptions) -> Vec<String> {
    match &options.metrics {
        Some(filter) => filter.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect(),
        None => metrics.metric_names(),
    }
}

/// Compute all stats rows for one run.
///
/// `file_dirs` maps every file id of the layout run to its directory's
/// arena index (see `DirTree::attach_files`). Rows come back sorted by
/// (scope, dir_path, metric); that triple is the row key, so the order is
/// total and reruns are byte-identical.
pub fn rollup_run(
    run_id: &str,
    tree: &DirTree,
    file_dirs: &BTreeMap<String, usize>,
    metrics: &NormalizedMetrics,
    options: &RollupOptions,
) -> Result<Vec<StatsRow>, AggregateError> {
    let metric_names = effective_metrics(metrics, options);
    let mut rows: Vec<StatsRow> = Vec::new();

    for metric in &metric_names {
        let direct = group_direct(tree, file_dirs, metrics, metric)?;

        if options.scopes.includes(Scope::Direct) {
            for (idx, values) in direct.iter().enumerate() {
                rows.push(make_row(run_id, tree, idx, metric, Scope::Direct, values, options));
            }
        }

        if options.scopes.includes(Scope::Recursive) {
            // Bottom-up pass: stats for a directory are taken while its
            // accumulator is complete, then its values move to the parent.
            let mut acc = direct;
            for level in tree.levels() {
                for &idx in level {
                    rows.push(make_row(
                        run_id,
                        tree,
                        idx,
                        metric,
                        Scope::Recursive,
                        &acc[idx],
                        options,
                    ));
                    if let Some(parent) = tree.parent_of(idx) {
                        let moved = std::mem::take(&mut acc[idx]);
                        acc[parent].extend(moved);
                    }
                }
            }
        }
    }

    rows.sort_by(|a, b| {
        a.scope
            .cmp(&b.scope)
            .then_with(|| a.dir_path.cmp(&b.dir_path))
            .then_with(|| a.metric.cmp(&b.metric))
    });
    Ok(rows)
}

/// One value bucket per directory, holding the metric values of the files
/// immediately inside it.
fn group_direct(
    tree: &DirTree,
    file_dirs: &BTreeMap<String, usize>,
    metrics: &NormalizedMetrics,
    metric: &str,
) -> Result<Vec<Vec<f64>>, AggregateError> {
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); tree.len()];
    if let Some(values) = metrics.values_for(metric) {
        for (file_id, value) in values {
            let idx = *file_dirs
                .get(file_id)
                .ok_or_else(|| AggregateError::UnknownFile {
                    file_id: file_id.clone(),
                    metric: metric.to_string(),
                })?;
            buckets[idx].push(*value);
        }
    }
    Ok(buckets)
}

fn make_row(
    run_id: &str,
    tree: &DirTree,
    idx: usize,
    metric: &str,
    scope: Scope,
    values: &[f64],
    options: &RollupOptions,
) -> StatsRow {
    let rec = tree.get(idx);
    StatsRow {
        run_id: run_id.to_string(),
        dir_id: rec.dir_id.clone(),
        dir_path: rec.path.clone(),
        metric: metric.to_string(),
        scope,
        dist: stats::distribution(values, options.include_inequality),
    }
}
