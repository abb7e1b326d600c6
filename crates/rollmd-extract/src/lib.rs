//! # rollmd-extract
//!
//! **Tier 1 (Extraction & Normalization)**
//!
//! Reduces a producer run's raw observations to exactly one value per
//! (file, metric). Re-ingestion and multi-row producers legitimately emit
//! duplicates; resolution is deterministic last-write-wins over the
//! explicit `seq` ingest key. Duplicates that *disagree* beyond tolerance
//! are a data problem, not a tie to break silently, and fail the run.
//!
//! Null observations never reach aggregation: they contribute nothing to
//! any numerator or denominator.
//!
//! ## What belongs here
//! * Grouping, ordering and conflict checks for raw observations
//! * The per-producer profile table (a tagged variant, not inheritance)
//!
//! ## What does NOT belong here
//! * Tree construction or aggregation
//! * Schema validation of raw records (upstream responsibility)

use std::collections::BTreeMap;

use rollmd_tree::AncestryMode;
use rollmd_types::{DuplicateNote, Observation};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    #[error(
        "conflicting duplicates for file {file_id} metric {metric}: kept {kept}, saw {discarded} (spread {spread} > tolerance {tolerance})"
    )]
    DuplicateConflict {
        file_id: String,
        metric: String,
        kept: f64,
        discarded: f64,
        spread: f64,
        tolerance: f64,
    },
}

/// One authoritative value per (file, metric), grouped by metric.
///
/// Both map layers are ordered so every downstream iteration is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedMetrics {
    values: BTreeMap<String, BTreeMap<String, f64>>,
}

impl NormalizedMetrics {
    /// Metric names present in the run, ascending.
    #[must_use]
    pub fn metric_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn values_for(&self, metric: &str) -> Option<&BTreeMap<String, f64>> {
        self.values.get(metric)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of normalization: the value table plus non-fatal duplicate notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractOutcome {
    pub metrics: NormalizedMetrics,
    pub duplicate_notes: Vec<DuplicateNote>,
}

/// Collapse raw observations into one value per (file, metric).
///
/// Within each group, rows are ordered by `(seq, input position)` and the
/// last row is authoritative, including an authoritative null, which
/// drops the pair from aggregation. Disagreement among the group's
/// non-null values beyond `tolerance` (absolute) is fatal; smaller
/// disagreements resolve to the winner and are surfaced as notes.
pub fn normalize(
    observations: &[Observation],
    tolerance: f64,
) -> Result<ExtractOutcome, ExtractError> {
    let mut grouped: BTreeMap<(String, String), Vec<(u64, usize, Option<f64>)>> = BTreeMap::new();
    for (pos, obs) in observations.iter().enumerate() {
        grouped
            .entry((obs.metric.clone(), obs.file_id.clone()))
            .or_default()
            .push((obs.seq, pos, obs.value));
    }

    let mut outcome = ExtractOutcome::default();
    for ((metric, file_id), mut rows) in grouped {
        rows.sort_by_key(|(seq, pos, _)| (*seq, *pos));

        let non_null: Vec<f64> = rows.iter().filter_map(|(_, _, v)| *v).collect();
        if non_null.len() > 1 {
            let kept = *non_null.last().expect("non-empty");
            let lo = non_null.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = non_null.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let spread = hi - lo;
            if spread > tolerance {
                let discarded = farthest_from(kept, &non_null);
                return Err(ExtractError::DuplicateConflict {
                    file_id,
                    metric,
                    kept,
                    discarded,
                    spread,
                    tolerance,
                });
            }
            if spread > 0.0 {
                outcome.duplicate_notes.push(DuplicateNote {
                    file_id: file_id.clone(),
                    metric: metric.clone(),
                    kept,
                    discarded: farthest_from(kept, &non_null),
                    spread,
                });
            }
        }

        let authoritative = rows.last().and_then(|(_, _, v)| *v);
        if let Some(value) = authoritative {
            outcome
                .metrics
                .values
                .entry(metric)
                .or_default()
                .insert(file_id, value);
        }
    }

    Ok(outcome)
}

fn farthest_from(kept: f64, values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .max_by(|a, b| {
            (a - kept)
                .abs()
                .partial_cmp(&(b - kept).abs())
                .expect("finite values")
        })
        .unwrap_or(kept)
}

// -------------------------
// Producer profiles
// -------------------------

/// Producers with known extraction quirks. Everything else is `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerKind {
    Layout,
    Scc,
    Lizard,
    GitBlame,
    Generic,
}

impl ProducerKind {
    #[must_use]
    pub fn from_producer(producer: &str) -> Self {
        match producer {
            "layout" | "layout-scanner" => Self::Layout,
            "scc" => Self::Scc,
            "lizard" => Self::Lizard,
            "git-blame" | "git-blame-scanner" => Self::GitBlame,
            _ => Self::Generic,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Scc => "scc",
            Self::Lizard => "lizard",
            Self::GitBlame => "git-blame",
            Self::Generic => "generic",
        }
    }
}

/// How a producer's rows bind to the tree.
///
/// Selected by producer name; a tagged table rather than an inheritance
/// hierarchy, so adding a producer is one match arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerProfile {
    pub kind: ProducerKind,
    pub ancestry: AncestryMode,
}

impl ProducerProfile {
    #[must_use]
    pub fn for_producer(producer: &str) -> Self {
        let kind = ProducerKind::from_producer(producer);
        let ancestry = match kind {
            // git-blame output carries paths only; ancestry falls back to
            // prefix matching instead of id chains.
            ProducerKind::GitBlame => AncestryMode::PathPrefix,
            _ => AncestryMode::ParentChain,
        };
        Self { kind, ancestry }
    }
}
