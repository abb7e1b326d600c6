//! # rollmd-format
//!
//! **Tier 4 (Formatting)**
//!
//! Renders published stats rows as Markdown or TSV tables for terminals
//! and PR comments. Output is plain text, deterministic, and free of ANSI
//! escapes.
//!
//! ## What belongs here
//! * Markdown template rendering
//! * TSV serialization of the full stats vector
//! * The one-line run summary
//!
//! ## What does NOT belong here
//! * Business logic (calculating stats)
//! * CLI arg parsing

use rollmd_types::{RollupReceipt, Scope, StatsRow};

/// Render the top directories for one metric and scope as a Markdown
/// table, ranked by total mass (mean x count) descending, path ascending
/// on ties. `top == 0` means no limit.
#[must_use]
pub fn render_md(rows: &[StatsRow], scope: Scope, metric: &str, top: usize) -> String {
    let mut picked: Vec<&StatsRow> = rows
        .iter()
        .filter(|r| r.scope == scope && r.metric == metric)
        .collect();
    picked.sort_by(|a, b| {
        total(b)
            .partial_cmp(&total(a))
            .expect("totals are finite")
            .then_with(|| a.dir_path.cmp(&b.dir_path))
    });
    if top > 0 && picked.len() > top {
        picked.truncate(top);
    }

    let mut s = String::new();
    s.push_str(&format!("### {metric} ({})\n\n", scope.as_str()));
    s.push_str("|Directory|Count|Mean|Median|P95|Max|Gini|\n");
    s.push_str("|---|---:|---:|---:|---:|---:|---:|\n");
    for row in picked {
        s.push_str(&format!(
            "|{}|{}|{}|{}|{}|{}|{}|\n",
            row.dir_path,
            row.dist.count,
            fmt(row.dist.mean),
            fmt(row.dist.median),
            fmt(row.dist.p95),
            fmt(row.dist.max),
            fmt(row.dist.gini),
        ));
    }
    s
}

/// Render every row as TSV with the full statistics vector. Rows keep the
/// order they were published in.
#[must_use]
pub fn render_tsv(rows: &[StatsRow]) -> String {
    let mut s = String::new();
    s.push_str(
        "run_id\tdir_id\tdir_path\tmetric\tscope\tcount\tmin\tmax\tmean\tmedian\tstddev\t\
         p25\tp50\tp75\tp90\tp95\tp99\tskewness\tkurtosis\tcv\tiqr\tgini\ttheil\thoover\t\
         palma\ttop_10_pct_share\ttop_20_pct_share\tbottom_50_pct_share\n",
    );
    for row in rows {
        let d = &row.dist;
        let cells = [
            row.run_id.clone(),
            row.dir_id.clone(),
            row.dir_path.clone(),
            row.metric.clone(),
            row.scope.as_str().to_string(),
            d.count.to_string(),
            fmt(d.min),
            fmt(d.max),
            fmt(d.mean),
            fmt(d.median),
            fmt(d.stddev),
            fmt(d.p25),
            fmt(d.p50),
            fmt(d.p75),
            fmt(d.p90),
            fmt(d.p95),
            fmt(d.p99),
            fmt(d.skewness),
            fmt(d.kurtosis),
            fmt(d.cv),
            fmt(d.iqr),
            fmt(d.gini),
            fmt(d.theil),
            fmt(d.hoover),
            fmt(d.palma),
            fmt(d.top_10_pct_share),
            fmt(d.top_20_pct_share),
            fmt(d.bottom_50_pct_share),
        ];
        s.push_str(&cells.join("\t"));
        s.push('\n');
    }
    s
}

/// One-line run summary for stderr.
#[must_use]
pub fn summary_line(receipt: &RollupReceipt) -> String {
    format!(
        "run {}: {} rows, {} metric(s), {} violation(s), {} duplicate note(s)",
        receipt.run_id,
        receipt.row_count,
        receipt.metrics.len(),
        receipt.diagnostics.violations.len(),
        receipt.diagnostics.duplicate_notes.len(),
    )
}

fn total(row: &StatsRow) -> f64 {
    row.dist.mean.unwrap_or(0.0) * row.dist.count as f64
}

/// Render a nullable statistic; absent values print as `-`.
fn fmt(value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) => {
            let mut s = format!("{v:.4}");
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
            s
        }
    }
}
