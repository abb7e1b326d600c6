//! # rollmd-validate
//!
//! **Tier 3 (Invariant Validation)**
//!
//! Checks the consistency relationship between the direct and recursive
//! views of every (run, directory, metric) pair that carries both scopes:
//!
//! * `recursive.count >= direct.count`
//! * `recursive.min   <= direct.min` (when both are non-null)
//! * `recursive.max   >= direct.max` (when both are non-null)
//!
//! Violations are collected and reported, never raised: visibility beats
//! suppression, and whether a flagged run is acceptable is the caller's
//! call (a CI gate, typically), not this crate's.

use std::collections::BTreeMap;

use rollmd_types::{Scope, StatsRow, Violation, ViolationKind};

/// Check every pair present in both scopes and collect violations.
///
/// Rows carrying only one scope (partial scope selection) have nothing to
/// compare and are skipped. The result is ordered by (run, dir_path,
/// metric), following the row ordering contract.
#[must_use]
pub fn validate_rows(rows: &[StatsRow]) -> Vec<Violation> {
    // (run, dir, metric) -> (direct?, recursive?)
    let mut pairs: BTreeMap<(&str, &str, &str), (Option<&StatsRow>, Option<&StatsRow>)> =
        BTreeMap::new();
    for row in rows {
        let entry = pairs
            .entry((row.run_id.as_str(), row.dir_id.as_str(), row.metric.as_str()))
            .or_insert((None, None));
        match row.scope {
            Scope::Direct => entry.0 = Some(row),
            Scope::Recursive => entry.1 = Some(row),
        }
    }

    let mut violations = Vec::new();
    for (direct, recursive) in pairs.values() {
        let (Some(direct), Some(recursive)) = (direct, recursive) else {
            continue;
        };

        if recursive.dist.count < direct.dist.count {
            violations.push(violation(
                direct,
                ViolationKind::RecursiveCountBelowDirect,
                direct.dist.count as f64,
                recursive.dist.count as f64,
            ));
        }
        if let (Some(dmin), Some(rmin)) = (direct.dist.min, recursive.dist.min) {
            if rmin > dmin {
                violations.push(violation(
                    direct,
                    ViolationKind::RecursiveMinAboveDirect,
                    dmin,
                    rmin,
                ));
            }
        }
        if let (Some(dmax), Some(rmax)) = (direct.dist.max, recursive.dist.max) {
            if rmax < dmax {
                violations.push(violation(
                    direct,
                    ViolationKind::RecursiveMaxBelowDirect,
                    dmax,
                    rmax,
                ));
            }
        }
    }

    violations.sort_by(|a, b| {
        a.run_id
            .cmp(&b.run_id)
            .then_with(|| a.dir_path.cmp(&b.dir_path))
            .then_with(|| a.metric.cmp(&b.metric))
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
    });
    violations
}

fn violation(row: &StatsRow, kind: ViolationKind, direct: f64, recursive: f64) -> Violation {
    Violation {
        run_id: row.run_id.clone(),
        dir_id: row.dir_id.clone(),
        dir_path: row.dir_path.clone(),
        metric: row.metric.clone(),
        kind,
        direct_value: direct,
        recursive_value: recursive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollmd_types::Distribution;

    fn row(dir: &str, metric: &str, scope: Scope, count: usize, min: f64, max: f64) -> StatsRow {
        StatsRow {
            run_id: "r1".into(),
            dir_id: dir.into(),
            dir_path: dir.into(),
            metric: metric.into(),
            scope,
            dist: Distribution {
                count,
                min: Some(min),
                max: Some(max),
                ..Default::default()
            },
        }
    }

    #[test]
    fn consistent_pairs_produce_no_violations() {
        let rows = vec![
            row("a", "loc", Scope::Direct, 1, 10.0, 10.0),
            row("a", "loc", Scope::Recursive, 2, 10.0, 20.0),
        ];
        assert!(validate_rows(&rows).is_empty());
    }

    #[test]
    fn count_regression_is_reported_with_the_offending_triple() {
        let rows = vec![
            row("a", "loc", Scope::Direct, 3, 1.0, 9.0),
            row("a", "loc", Scope::Recursive, 2, 1.0, 9.0),
        ];
        let violations = validate_rows(&rows);
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.kind, ViolationKind::RecursiveCountBelowDirect);
        assert_eq!((v.dir_id.as_str(), v.metric.as_str()), ("a", "loc"));
        assert_eq!(v.direct_value, 3.0);
        assert_eq!(v.recursive_value, 2.0);
    }

    #[test]
    fn min_and_max_breaches_are_reported_independently() {
        let rows = vec![
            row("a", "loc", Scope::Direct, 1, 5.0, 9.0),
            row("a", "loc", Scope::Recursive, 2, 6.0, 8.0),
        ];
        let violations = validate_rows(&rows);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].kind, ViolationKind::RecursiveMaxBelowDirect);
        assert_eq!(violations[1].kind, ViolationKind::RecursiveMinAboveDirect);
    }

    #[test]
    fn null_extremes_skip_the_min_max_checks() {
        let mut direct = row("a", "loc", Scope::Direct, 0, 0.0, 0.0);
        direct.dist.min = None;
        direct.dist.max = None;
        direct.dist.count = 0;
        let recursive = row("a", "loc", Scope::Recursive, 2, 1.0, 2.0);
        assert!(validate_rows(&[direct, recursive]).is_empty());
    }

    #[test]
    fn single_scope_rows_are_skipped() {
        let rows = vec![row("a", "loc", Scope::Direct, 1, 1.0, 1.0)];
        assert!(validate_rows(&rows).is_empty());
    }

    #[test]
    fn violations_come_back_ordered_by_triple() {
        let rows = vec![
            row("b", "loc", Scope::Direct, 3, 0.0, 0.0),
            row("b", "loc", Scope::Recursive, 1, 0.0, 0.0),
            row("a", "loc", Scope::Direct, 3, 0.0, 0.0),
            row("a", "loc", Scope::Recursive, 1, 0.0, 0.0),
        ];
        let violations = validate_rows(&rows);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].dir_id, "a");
        assert_eq!(violations[1].dir_id, "b");
    }
}
