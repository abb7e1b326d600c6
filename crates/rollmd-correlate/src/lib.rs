//! # rollmd-correlate
//!
//! **Tier 1 (Run Correlation)**
//!
//! Resolves which layout run supplies the canonical tree for a producer
//! run. Rollups require exactly one tree per collection; zero or several
//! candidates are fatal before any aggregation starts.
//!
//! The layout producer has carried more than one name over its history;
//! lookups accept any of them so callers never need to know which name a
//! given run was registered under.

use rollmd_types::{RunCorrelation, RunRecord};
use thiserror::Error;

/// Every name the tree-defining producer has been registered under.
pub const LAYOUT_PRODUCERS: [&str; 2] = ["layout", "layout-scanner"];

/// True when `producer` is (any historical name of) the layout producer.
#[must_use]
pub fn is_layout_producer(producer: &str) -> bool {
    LAYOUT_PRODUCERS.contains(&producer)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrelateError {
    #[error("run {run_id} not found in registry")]
    UnknownRun { run_id: String },
    #[error("no layout run found for collection {collection_id}")]
    MissingLayoutRun { collection_id: String },
    #[error("multiple layout runs for collection {collection_id}: {candidates:?}")]
    AmbiguousLayoutRun {
        collection_id: String,
        candidates: Vec<String>,
    },
}

/// In-memory view of the run registry for one rollup invocation.
#[derive(Debug, Clone)]
pub struct RunRegistry {
    runs: Vec<RunRecord>,
}

impl RunRegistry {
    #[must_use]
    pub fn new(runs: Vec<RunRecord>) -> Self {
        Self { runs }
    }

    pub fn get(&self, run_id: &str) -> Option<&RunRecord> {
        self.runs.iter().find(|r| r.run_id == run_id)
    }

    /// The single layout run sharing `collection_id`, or a fatal error.
    pub fn resolve_layout_run(&self, collection_id: &str) -> Result<&RunRecord, CorrelateError> {
        let mut candidates = self
            .runs
            .iter()
            .filter(|r| r.collection_id == collection_id && is_layout_producer(&r.producer));
        let first = candidates.next().ok_or_else(|| CorrelateError::MissingLayoutRun {
            collection_id: collection_id.to_string(),
        })?;
        if let Some(second) = candidates.next() {
            let mut ids = vec![first.run_id.clone(), second.run_id.clone()];
            ids.extend(candidates.map(|r| r.run_id.clone()));
            return Err(CorrelateError::AmbiguousLayoutRun {
                collection_id: collection_id.to_string(),
                candidates: ids,
            });
        }
        Ok(first)
    }

    /// Correlate a producer run with its tree-defining layout run.
    pub fn correlate(&self, run_id: &str) -> Result<RunCorrelation, CorrelateError> {
        let run = self.get(run_id).ok_or_else(|| CorrelateError::UnknownRun {
            run_id: run_id.to_string(),
        })?;
        let layout = self.resolve_layout_run(&run.collection_id)?;
        Ok(RunCorrelation {
            run_id: run.run_id.clone(),
            layout_run_id: layout.run_id.clone(),
            collection_id: run.collection_id.clone(),
        })
    }
}
