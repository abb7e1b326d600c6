//! # rollmd-types
//!
//! **Tier 0 (Core Types)**
//!
//! This crate defines the core data structures and contracts for `rollmd`.
//! It contains only data types, Serde definitions, and `schema_version`.
//!
//! ## Stability Policy
//!
//! **JSON-first stability**: The primary contract is the JSON schema, not Rust struct literals.
//!
//! - **JSON consumers**: Stable. New fields have sensible defaults; removed/renamed fields
//!   bump `SCHEMA_VERSION`.
//! - **Rust library consumers**: Semi-stable. New fields may be added in minor versions,
//!   which can break struct literal construction. Use `Default` + field mutation or
//!   `..Default::default()` patterns for forward compatibility.
//!
//! ## What belongs here
//! * Pure data structs (records, rows, receipts, diagnostics)
//! * Serialization/Deserialization logic
//! * Stability markers (SCHEMA_VERSION)
//!
//! ## What does NOT belong here
//! * File I/O
//! * CLI argument parsing
//! * Aggregation or statistics logic

use serde::{Deserialize, Serialize};

/// The current schema version for all receipt and row types.
pub const SCHEMA_VERSION: u32 = 3;

// -------------------------
// Input records
// -------------------------

/// One directory in the canonical hierarchy of a layout run.
///
/// The directory set for a run forms a tree: exactly one record has
/// `parent_id == None` (the root), every other record names an existing
/// parent, and the graph is acyclic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub dir_id: String,
    /// Repo-relative path with `/` separators and no trailing slash.
    pub path: String,
    pub parent_id: Option<String>,
    /// Depth as declared by the layout producer (root = 0).
    pub depth: u32,
}

/// One file in the canonical hierarchy of a layout run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub file_id: String,
    /// The immediate containing directory; must exist in the same run.
    pub dir_id: String,
    pub path: String,
}

/// One raw per-file measurement emitted by a producer run.
///
/// A run may contain several observations for the same `(file_id, metric)`
/// pair (re-ingestion, multi-row producers); `seq` is the explicit ingest
/// order used to resolve them deterministically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub run_id: String,
    pub producer: String,
    pub file_id: String,
    pub metric: String,
    /// Missing measurements stay `None`; they are excluded from every
    /// aggregate rather than treated as zero.
    pub value: Option<f64>,
    pub seq: u64,
}

/// One run known to the run registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    pub run_id: String,
    pub producer: String,
    /// Correlation key shared by all runs analyzing the same snapshot.
    pub collection_id: String,
}

/// The resolved link between a producer run and the layout run that
/// defines the tree its metrics attach to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunCorrelation {
    pub run_id: String,
    pub layout_run_id: String,
    pub collection_id: String,
}

// -------------------------
// Published rows
// -------------------------

/// Aggregation scope for a published row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Files immediately inside the directory.
    Direct,
    /// Files anywhere in the directory's subtree.
    Recursive,
}

impl Scope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Recursive => "recursive",
        }
    }
}

/// Which scopes a rollup invocation should compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ScopeSelection {
    Direct,
    Recursive,
    #[default]
    Both,
}

impl ScopeSelection {
    pub const fn includes(self, scope: Scope) -> bool {
        match self {
            Self::Both => true,
            Self::Direct => matches!(scope, Scope::Direct),
            Self::Recursive => matches!(scope, Scope::Recursive),
        }
    }
}

/// The fixed distribution-statistics vector computed for one value set.
///
/// `count` is always present. Every other field is `None` whenever the
/// statistic is undefined for the input (empty set, too few points, zero
/// total, zero mean), so "no data" serializes as an explicit `null` and is
/// distinguishable from a computed zero.
///
/// The concentration block (gini through bottom_50_pct_share) assumes
/// non-negative metric values; counts, sizes and complexity scores all are.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Distribution {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub stddev: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    /// Coefficient of variation (stddev / mean).
    pub cv: Option<f64>,
    /// Interquartile range (p75 - p25).
    pub iqr: Option<f64>,
    pub gini: Option<f64>,
    pub theil: Option<f64>,
    pub hoover: Option<f64>,
    pub palma: Option<f64>,
    pub top_10_pct_share: Option<f64>,
    pub top_20_pct_share: Option<f64>,
    pub bottom_50_pct_share: Option<f64>,
}

/// One published stats row, keyed by (run, directory, metric, scope).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsRow {
    pub run_id: String,
    pub dir_id: String,
    pub dir_path: String,
    pub metric: String,
    pub scope: Scope,
    #[serde(flatten)]
    pub dist: Distribution,
}

// -------------------------
// Diagnostics
// -------------------------

/// A duplicate observation that was resolved within tolerance.
///
/// Non-fatal: the later value (by `seq`) won and the run continued, but the
/// disagreement is surfaced so re-ingestion problems stay visible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateNote {
    pub file_id: String,
    pub metric: String,
    pub kept: f64,
    pub discarded: f64,
    pub spread: f64,
}

/// Which direct/recursive consistency guarantee a row pair broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    RecursiveCountBelowDirect,
    RecursiveMinAboveDirect,
    RecursiveMaxBelowDirect,
}

impl ViolationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RecursiveCountBelowDirect => "recursive_count_below_direct",
            Self::RecursiveMinAboveDirect => "recursive_min_above_direct",
            Self::RecursiveMaxBelowDirect => "recursive_max_below_direct",
        }
    }
}

/// A detected consistency violation, keyed by the offending triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub run_id: String,
    pub dir_id: String,
    pub dir_path: String,
    pub metric: String,
    pub kind: ViolationKind,
    pub direct_value: f64,
    pub recursive_value: f64,
}

/// Non-fatal findings delivered alongside successful output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Diagnostics {
    pub duplicate_notes: Vec<DuplicateNote>,
    pub violations: Vec<Violation>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.duplicate_notes.is_empty() && self.violations.is_empty()
    }
}

// -------------------------
// Options and receipt
// -------------------------

/// Invocation parameters for one rollup run.
///
/// The percentile set is fixed (not configurable) so published rows stay
/// comparable across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollupOptions {
    pub scopes: ScopeSelection,
    /// Metric filter; `None` means every metric present in the run.
    pub metrics: Option<Vec<String>>,
    pub include_inequality: bool,
    /// Absolute tolerance for disagreeing duplicate observations.
    pub duplicate_tolerance: f64,
}

impl Default for RollupOptions {
    fn default() -> Self {
        Self {
            scopes: ScopeSelection::Both,
            metrics: None,
            include_inequality: true,
            duplicate_tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

impl ToolInfo {
    pub fn current() -> Self {
        Self {
            name: "rollmd".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Terminal state of a rollup run.
///
/// A failed run publishes no rows; the variant exists so consumers reading
/// receipts from a run store can represent both outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Published,
    Failed,
}

/// Echo of the invocation parameters, embedded in the receipt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollupArgsMeta {
    pub scopes: ScopeSelection,
    pub include_inequality: bool,
    pub duplicate_tolerance: f64,
}

/// The receipt envelope written next to published stats rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollupReceipt {
    pub schema_version: u32,
    pub generated_at_ms: u128,
    pub tool: ToolInfo,
    pub status: RunStatus,
    pub run_id: String,
    pub layout_run_id: String,
    pub collection_id: String,
    pub args: RollupArgsMeta,
    /// Metrics actually rolled up, sorted ascending.
    pub metrics: Vec<String>,
    pub row_count: usize,
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_serializes_to_snake_case() {
        assert_eq!(serde_json::to_string(&Scope::Direct).unwrap(), "\"direct\"");
        assert_eq!(
            serde_json::to_string(&Scope::Recursive).unwrap(),
            "\"recursive\""
        );
    }

    #[test]
    fn scope_ordering_puts_direct_first() {
        assert!(Scope::Direct < Scope::Recursive);
    }

    #[test]
    fn scope_selection_includes_expected_scopes() {
        assert!(ScopeSelection::Both.includes(Scope::Direct));
        assert!(ScopeSelection::Both.includes(Scope::Recursive));
        assert!(ScopeSelection::Direct.includes(Scope::Direct));
        assert!(!ScopeSelection::Direct.includes(Scope::Recursive));
        assert!(!ScopeSelection::Recursive.includes(Scope::Direct));
    }

    #[test]
    fn empty_distribution_serializes_nulls_not_omissions() {
        let dist = Distribution::default();
        let json = serde_json::to_string(&dist).unwrap();
        assert!(json.contains("\"count\":0"));
        assert!(json.contains("\"gini\":null"));
        assert!(json.contains("\"stddev\":null"));
    }

    #[test]
    fn stats_row_flattens_distribution_fields() {
        let row = StatsRow {
            run_id: "r1".into(),
            dir_id: "d1".into(),
            dir_path: "src".into(),
            metric: "line_count".into(),
            scope: Scope::Direct,
            dist: Distribution {
                count: 1,
                min: Some(5.0),
                max: Some(5.0),
                ..Default::default()
            },
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"metric\":\"line_count\""));
        assert!(json.contains("\"count\":1"));
        assert!(!json.contains("\"dist\""));
    }

    #[test]
    fn stats_row_roundtrips_through_json() {
        let row = StatsRow {
            run_id: "r1".into(),
            dir_id: "d1".into(),
            dir_path: "src/app".into(),
            metric: "complexity".into(),
            scope: Scope::Recursive,
            dist: Distribution {
                count: 3,
                min: Some(1.0),
                max: Some(9.0),
                mean: Some(4.0),
                ..Default::default()
            },
        };
        let json = serde_json::to_string(&row).unwrap();
        let back: StatsRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn observation_null_value_roundtrips() {
        let json = r#"{"run_id":"r","producer":"scc","file_id":"f","metric":"loc","value":null,"seq":7}"#;
        let obs: Observation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.value, None);
        assert_eq!(obs.seq, 7);
    }

    #[test]
    fn default_options_cover_both_scopes_and_all_metrics() {
        let opts = RollupOptions::default();
        assert_eq!(opts.scopes, ScopeSelection::Both);
        assert!(opts.metrics.is_none());
        assert!(opts.include_inequality);
    }

    #[test]
    fn violation_kind_names_are_stable() {
        let kind = ViolationKind::RecursiveCountBelowDirect;
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            format!("\"{}\"", kind.as_str())
        );
    }
}
